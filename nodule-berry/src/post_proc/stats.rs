use std::sync::atomic::{AtomicUsize, Ordering};

/// 局部精化的成功/失败计数器.
///
/// 所有方法都只需要 `&self`, 因此同一实例可以在多个线程间共享
/// (例如放在 `Arc` 中, 或直接借用给 `rayon` 任务).
#[derive(Debug, Default)]
pub struct RefineStats {
    successes: AtomicUsize,
    failures: AtomicUsize,
}

impl RefineStats {
    /// 初始化, 两个计数器均为 0.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次尝试的结果.
    #[inline]
    pub fn record(&self, success: bool) {
        let counter = if success {
            &self.successes
        } else {
            &self.failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// 成功次数.
    #[inline]
    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::Relaxed)
    }

    /// 失败次数.
    #[inline]
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// 总尝试次数.
    #[inline]
    pub fn attempts(&self) -> usize {
        self.successes() + self.failures()
    }

    /// 成功率. 尚无任何尝试时返回 `None`.
    pub fn success_rate(&self) -> Option<f64> {
        let (s, f) = (self.successes(), self.failures());
        match s + f {
            0 => None,
            n => Some(s as f64 / n as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RefineStats;
    use std::sync::Arc;
    use threadpool::ThreadPool;

    #[test]
    fn test_rate() {
        let stats = RefineStats::new();
        assert_eq!(stats.success_rate(), None);
        stats.record(true);
        stats.record(true);
        stats.record(false);
        stats.record(true);
        assert_eq!(stats.successes(), 3);
        assert_eq!(stats.failures(), 1);
        assert_eq!(stats.attempts(), 4);
        assert_eq!(stats.success_rate(), Some(0.75));
    }

    #[test]
    fn test_concurrent_record() {
        let stats = Arc::new(RefineStats::new());
        let pool = ThreadPool::new(num_cpus::get());
        for i in 0..1000 {
            let stats = Arc::clone(&stats);
            pool.execute(move || stats.record(i % 4 != 0));
        }
        pool.join();
        assert_eq!(stats.successes(), 750);
        assert_eq!(stats.failures(), 250);
    }

    #[test]
    fn test_borrowed_by_rayon_tasks() {
        use rayon::prelude::*;

        let stats = RefineStats::new();
        (0..1000).into_par_iter().for_each(|i| stats.record(i % 5 == 0));
        assert_eq!(stats.successes(), 200);
        assert_eq!(stats.failures(), 800);
        assert_eq!(stats.success_rate(), Some(0.2));
    }
}
