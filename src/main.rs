fn main() {
    roh_pipeline::cli::run();
}
