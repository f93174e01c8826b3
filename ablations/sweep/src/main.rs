//! DoG 斑点检测参数消融实验.
//!
//! 在确定性的合成模体切片上, 为每组参数各开一个线程运行完整的单切片流程,
//! 最后打印每组参数的统计结果.

mod phantom;
mod profile;
mod result;
mod runner;

fn main() {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()
        .expect("Logger initialization error");

    runner::run().analyze();
}
