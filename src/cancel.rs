//! Cooperative cancellation for row-group streams.
//!
//! Readers check the token before each row group, writers before each
//! row-group write and between groups. Work already in flight is not
//! interrupted. The token is `tokio_util`'s; `cancel` and `is_cancelled` are
//! plain synchronous calls, so no runtime is involved.

pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn child_tokens_follow_the_parent() {
        let parent = CancellationToken::new();
        let child = parent.child_token();
        parent.cancel();
        assert!(child.is_cancelled());
    }
}
