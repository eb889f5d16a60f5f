use PhaseFV::Examples::shock_tube_examples::shock_tube_examples;
use PhaseFV::Utils::logger::init_logger;
use log::LevelFilter;

pub fn main() {
    init_logger(LevelFilter::Info);
    // 0 - Sod with every flux scheme, 1 - water/air shock tube, 2 - reacting closed box
    let task: usize = 0;
    shock_tube_examples(task);
}
