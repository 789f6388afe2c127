//! 生成序列中的资源就绪等待
//!
//! 宿主每帧只给一次执行机会，因此资源加载建模为有上限的轮询：每次尝试检查就绪，未就绪则让出一次，
//! 超过上限返回 AssetTimeout。轮询本身不依赖真实宿主，可以独立测试。

use crate::core::EngineError;

/// 默认轮询上限（约 2 秒 @60fps）
pub const DEFAULT_ASSET_POLL_ATTEMPTS: u32 = 120;

/// 有上限的就绪轮询
#[derive(Clone, Copy, Debug)]
pub struct BoundedPoll {
    max_attempts: u32,
}

impl BoundedPoll {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// 运行轮询：`ready` 返回 true 即成功，返回已用尝试次数；两次尝试之间调用 `yield_now`
    pub fn run<R, Y>(&self, mut ready: R, mut yield_now: Y) -> Result<u32, EngineError>
    where
        R: FnMut(u32) -> bool,
        Y: FnMut(),
    {
        for attempt in 1..=self.max_attempts {
            if ready(attempt) {
                return Ok(attempt);
            }
            if attempt < self.max_attempts {
                yield_now();
            }
        }
        Err(EngineError::AssetTimeout {
            attempts: self.max_attempts,
        })
    }
}

impl Default for BoundedPoll {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_POLL_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_within_limit() {
        let poll = BoundedPoll::new(120);
        let mut yields = 0;
        let result = poll.run(|attempt| attempt >= 5, || yields += 1);
        assert_eq!(result, Ok(5));
        assert_eq!(yields, 4);
    }

    #[test]
    fn test_times_out() {
        let poll = BoundedPoll::new(10);
        let mut yields = 0;
        let result = poll.run(|_| false, || yields += 1);
        assert_eq!(result, Err(EngineError::AssetTimeout { attempts: 10 }));
        // 最后一次失败后不再让出
        assert_eq!(yields, 9);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let poll = BoundedPoll::new(0);
        assert_eq!(poll.max_attempts(), 1);
        assert_eq!(poll.run(|_| true, || {}), Ok(1));

        let mut yields = 0;
        assert!(poll.run(|_| false, || yields += 1).is_err());
        assert_eq!(yields, 0);
    }
}
