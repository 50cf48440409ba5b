#![warn(rust_2018_idioms)]
#![allow(clippy::single_match)]

mod app;
mod util;

fn main() {
    util::log::init(util::log::level_from_env());

    let args: Vec<String> = std::env::args().skip(1).collect();
    app::CalculatorApp::new(args).run();
}
