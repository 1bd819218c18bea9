fn main() {
    env_logger::init();
    hand_coach::cli::run();
}
