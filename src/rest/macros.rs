/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

// Re-evaluates `$op` (an expression producing a future of `Result`) until it succeeds or the
// attempts run out. `$op` is expanded inside the loop so it may reborrow `&mut` state each time.
macro_rules! retry_with_backoff {
    ( $attempts:expr, $delay:expr, $op:expr ) => {{
        let mut backoff = $crate::rest::retry::Backoff::new($attempts, $delay);
        loop {
            match $op.await {
                Ok(v) => {
                    backoff.succeeded();
                    break Ok(v);
                }
                Err(err) => match backoff.failed() {
                    Some(delay) => {
                        ::log::warn!(
                            "Attempt failed ({}), {} left. Retrying after {:?}...",
                            err,
                            backoff.remaining(),
                            delay
                        );
                        ::tokio::time::sleep(delay).await;
                        backoff.resume();
                    }
                    None => break Err(err),
                },
            }
        }
    }};
}

pub(crate) use retry_with_backoff;
