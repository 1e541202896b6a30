//! 竞争窗口（二进制指数退避）

use rand::Rng;

#[derive(Debug, Clone)]
pub struct ContentionWindow {
    min: u32,
    max: u32,
    current: u32,
}

impl ContentionWindow {
    pub fn new(min: u32, max: u32) -> Self {
        let min = min.max(1);
        Self {
            min,
            max: max.max(min),
            current: min,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    /// 一次失败后窗口翻倍，不超过上限
    pub fn grow(&mut self) {
        self.current = self.current.saturating_mul(2).min(self.max);
    }

    /// 成功（或丢弃）后恢复初始窗口
    pub fn reset(&mut self) {
        self.current = self.min;
    }

    /// 在 `[0, current)` 中均匀抽取退避时隙数
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(0..self.current)
    }
}
