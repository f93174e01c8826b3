//! 参数组运行统计.

use nodule_berry::pipeline::SliceReport;
use std::time::{Duration, Instant};

/// 可累加计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    fn new() -> Self {
        Self {
            consumed: Duration::ZERO,
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间 (以微秒为单位).
    #[inline]
    fn total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

/// 一组参数在全部模体上的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 处理的切片数.
    images: u64,

    /// 模体中实际放置的结节数.
    nodules: u64,

    /// 检测到的关键点数.
    keypoints: u64,

    /// 精化成功且去重后的候选数.
    candidates: u64,

    /// 正样本候选数.
    positives: u64,

    /// 精化失败次数.
    refine_failures: u64,

    /// 标注分组失败的切片数.
    grouping_errors: u64,

    /// 处理切片花费的总时间.
    slice_time: AccTimer,

    /// 整个任务花费的总时间.
    real_time: AccTimer,

    /// 最耗时的一张切片. 尚无切片时为 `None`.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化, 同时开始整体计时.
    #[inline]
    pub fn new() -> Self {
        Self {
            images: 0,
            nodules: 0,
            keypoints: 0,
            candidates: 0,
            positives: 0,
            refine_failures: 0,
            grouping_errors: 0,
            slice_time: AccTimer::new(),
            real_time: AccTimer::new(),
            most: None,
        }
    }

    /// 开始一张切片的计时.
    #[inline]
    pub fn slice_start(&mut self) {
        self.slice_time.start();
    }

    /// 结束一张切片的计时, 并记录其结果.
    pub fn slice_finished(&mut self, report: &SliceReport, nodules: usize) {
        let d = self.slice_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));

        self.images += 1;
        self.nodules += nodules as u64;
        self.keypoints += report.keypoints.len() as u64;
        self.candidates += report.candidates.len() as u64;
        self.positives += report.positives() as u64;
        self.refine_failures += report.refine_failures as u64;
        self.grouping_errors += report.grouping_error.is_some() as u64;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    pub fn images(&self) -> u64 {
        self.images
    }

    pub fn nodules(&self) -> u64 {
        self.nodules
    }

    pub fn keypoints(&self) -> u64 {
        self.keypoints
    }

    pub fn candidates(&self) -> u64 {
        self.candidates
    }

    pub fn positives(&self) -> u64 {
        self.positives
    }

    pub fn refine_failures(&self) -> u64 {
        self.refine_failures
    }

    pub fn grouping_errors(&self) -> u64 {
        self.grouping_errors
    }

    /// 精化成功率. 没有任何精化尝试时返回 `None`.
    pub fn refine_success_rate(&self) -> Option<f64> {
        // 去重会丢掉一部分成功的精化, 因此以关键点数为分母.
        match self.keypoints {
            0 => None,
            n => Some((n - self.refine_failures) as f64 / n as f64),
        }
    }

    /// 以微秒为单位获得处理切片的总时间.
    #[inline]
    pub fn slice_time_us(&self) -> u64 {
        self.slice_time.total_us()
    }

    /// 以微秒为单位获得整体运行时间.
    #[inline]
    pub fn real_time_us(&self) -> u64 {
        self.real_time.total_us()
    }

    /// 以微秒为单位获得每张切片的平均处理时间.
    pub fn avg_slice_time_us(&self) -> Option<f64> {
        match self.images {
            0 => None,
            n => Some(self.slice_time_us() as f64 / n as f64),
        }
    }

    /// 最耗时的一张切片.
    #[inline]
    pub fn most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
