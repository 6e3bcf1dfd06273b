mod util;

fn main() {
    println!("{}", util::answer());
}
