//! 实验结果.

use crate::profile::Profile;
use std::io::{self, Write};

const SEP: &str = "--------------------------------------------------------";

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Images: {}", p.images())?;
    writeln!(w, "{S4}Planted nodules: {}", p.nodules())?;
    writeln!(w, "{S4}Keypoints: {}", p.keypoints())?;
    writeln!(w, "{S4}Refined candidates: {}", p.candidates())?;
    writeln!(w, "{S4}Positive candidates: {}", p.positives())?;
    writeln!(w, "{S4}Refinement failures: {}", p.refine_failures())?;
    writeln!(
        w,
        "{S4}Refinement success rate: {}",
        f64_to_display(p.refine_success_rate())
    )?;
    writeln!(w, "{S4}Grouping errors: {}", p.grouping_errors())?;
    writeln!(w, "{S4}Effective total time: {} us", p.slice_time_us())?;
    writeln!(
        w,
        "{S4}Effective average time: {} us",
        f64_to_display(p.avg_slice_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.real_time_us())?;
    let t = p.most_time_consuming().map(|d| d.as_micros() as f64);
    write!(
        w,
        "{S4}Most time-consuming slice costs {} us",
        f64_to_display(t)
    )?;
    Ok(())
}

/// 消融实验最终结果.
pub struct SweepResult {
    data: Vec<(&'static str, Profile)>,
}

impl FromIterator<(&'static str, Profile)> for SweepResult {
    fn from_iter<I: IntoIterator<Item = (&'static str, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }
}

impl SweepResult {
    /// 打印运行结果.
    pub fn analyze(&self) {
        println!("{SEP}");
        let mut buf = Vec::with_capacity(512);

        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut buf).expect("Writing into memory buffer error");
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            println!("{SEP}");
        }
    }
}
