//! 程序运行函数.

use crate::phantom::{self, Phantom};
use crate::profile::Profile;
use crate::result::SweepResult;
use nodule_berry::grouping::InMemoryGroundTruth;
use nodule_berry::prelude::*;
use std::thread;

/// 模体切片数.
const PHANTOMS: usize = 24;

/// 模体随机种子. 固定种子使每次运行结果可复现.
const SEED: u64 = 0x6e6f_6475_6c65;

/// 参与比较的参数组: `(名称, 对比度门限, 梯度门限, 邻域, 尺度数)`.
const PARAM_SETS: [(&str, f32, f32, (usize, usize, usize), usize); 4] = [
    ("dense", 5.0, 1.0, (3, 3, 3), 3),
    ("default", 10.0, 1.0, (3, 3, 3), 4),
    ("wide", 10.0, 1.0, (5, 5, 3), 4),
    ("coarse", 20.0, 2.0, (7, 7, 1), 5),
];

/// 用一组参数顺序处理全部模体.
fn sweep(phantoms: &[Phantom], truth: &InMemoryGroundTruth, params: &PipelineParams) -> Profile {
    let stats = RefineStats::new();
    let mut profile = Profile::new();
    for p in phantoms {
        profile.slice_start();
        let report = process_slice(&p.uid, p.image.as_immut(), truth, params, &stats);
        profile.slice_finished(&report, p.nodules);
    }
    log::info!(
        "refine stats: {} ok, {} failed",
        stats.successes(),
        stats.failures()
    );
    profile.finish()
}

/// 实际运行.
pub fn run() -> SweepResult {
    let (phantoms, truth) = phantom::generate(PHANTOMS, SEED);
    let params: Vec<(&'static str, PipelineParams)> = PARAM_SETS
        .iter()
        .map(|&(name, dog_thresh, gradient_thresh, shape, num_sigma)| {
            let dog = DogParams::new(dog_thresh, gradient_thresh, shape, num_sigma)
                .unwrap_or_else(|e| panic!("Invalid parameter set `{name}`: {e}"));
            let params = PipelineParams {
                dog,
                ..Default::default()
            };
            (name, params)
        })
        .collect();

    println!(
        "Running ablation studies: {} parameter sets, {} phantoms, {} cpus...",
        params.len(),
        phantoms.len(),
        num_cpus::get()
    );
    thread::scope(|s| {
        let (phantoms, truth) = (&phantoms, &truth);
        let handles: Vec<_> = params
            .iter()
            .map(|(name, p)| (*name, s.spawn(move || sweep(phantoms, truth, p))))
            .collect();

        handles
            .into_iter()
            .map(|(name, th)| (name, th.join().expect("Thread joining error")))
            .collect()
    })
}
