fn main() {
    lispy_cli::run()
}
