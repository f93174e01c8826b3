//! 合成模体: 带噪声暗背景上的若干亮圆盘, 以及对应的双阅片标注.

use ndarray::Array2;
use nodule_berry::grouping::{Annotation, InMemoryGroundTruth, NoduleKind};
use nodule_berry::{OwnedIntensitySlice, PixelCoord, Region};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 模体边长.
const SIDE: usize = 96;

/// 每行/列的网格数. 每个网格内至多放一个圆盘, 保证圆盘互不重叠.
const CELLS: usize = 3;

/// 可选的圆盘半径.
const RADII: [usize; 3] = [3, 5, 8];

/// 背景强度与噪声幅度.
const BACKGROUND: f32 = 30.0;
const NOISE: f32 = 8.0;

/// 一张合成切片.
pub struct Phantom {
    pub uid: String,
    pub image: OwnedIntensitySlice,
    pub nodules: usize,
}

/// 以 `(cx, cy)` 为中心, 半径为 `r` 的圆盘.
fn disc(cx: usize, cy: usize, r: usize) -> Region {
    let r2 = (r * r) as isize;
    (cy - r..=cy + r)
        .flat_map(|y| (cx - r..=cx + r).map(move |x| PixelCoord::new(x, y)))
        .filter(|p| {
            let (dx, dy) = (p.x as isize - cx as isize, p.y as isize - cy as isize);
            dx * dx + dy * dy <= r2
        })
        .collect()
}

/// 以固定种子生成 `count` 张切片及其标注.
///
/// 每个圆盘有两条标注: 阅片 `r0` 为圆盘本身, 阅片 `r1` 的半径小 1 像素.
pub fn generate(count: usize, seed: u64) -> (Vec<Phantom>, InMemoryGroundTruth) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut truth = InMemoryGroundTruth::new();
    let cell = SIDE / CELLS;

    let phantoms = (0..count)
        .map(|i| {
            let uid = format!("phantom-{i:03}");
            let mut data =
                Array2::from_shape_fn((SIDE, SIDE), |_| BACKGROUND + rng.random::<f32>() * NOISE);

            let mut nodules = 0;
            for (gy, gx) in (0..CELLS).flat_map(|gy| (0..CELLS).map(move |gx| (gy, gx))) {
                if !rng.random_bool(0.4) {
                    continue;
                }
                let r = RADII[rng.random_range(0..RADII.len())];
                let margin = RADII[RADII.len() - 1] + 2;
                let cx = gx * cell + rng.random_range(margin..cell - margin);
                let cy = gy * cell + rng.random_range(margin..cell - margin);
                let brightness = rng.random_range(180.0..220.0);

                let region = disc(cx, cy, r);
                for p in region.iter() {
                    data[p.hw()] = brightness;
                }
                let kind = if r >= RADII[1] {
                    NoduleKind::BigNodule
                } else {
                    NoduleKind::SmallNodule
                };
                truth.insert(Annotation::new(region, kind, "r0", uid.as_str(), "phantom"));
                truth.insert(Annotation::new(
                    disc(cx, cy, r - 1),
                    kind,
                    "r1",
                    uid.as_str(),
                    "phantom",
                ));
                nodules += 1;
            }

            Phantom {
                uid,
                image: OwnedIntensitySlice::from_array(data),
                nodules,
            }
        })
        .collect();
    (phantoms, truth)
}
