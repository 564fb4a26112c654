use std::error::Error;
use std::sync::Arc;
use log::debug;

use crate::CircuitBreaker;
use crate::CircuitBreakerError;

///
/// Called whenever the breaker denies a call, with the context, method and request
/// of that call. It runs on the calling path, before the denial is returned.
///
pub trait OpenStateHandler<C: ?Sized, Req: ?Sized> {
    fn handle(&self, ctx: &C, method: &str, req: &Req);
}

impl<C: ?Sized, Req: ?Sized, F> OpenStateHandler<C, Req> for F
    where F: Fn(&C, &str, &Req)
{
    fn handle(&self, ctx: &C, method: &str, req: &Req) {
        self(ctx, method, req)
    }
}

///
/// Wraps unary calls of an invoker into a circuit breaker.
///
pub struct UnaryInterceptor<B, H> {
    breaker: Arc<B>,
    handler: H,
}

impl<B, H> UnaryInterceptor<B, H>
    where B: CircuitBreaker
{
    pub fn new(breaker: Arc<B>, handler: H) -> Self {
        UnaryInterceptor { breaker, handler }
    }

    pub fn breaker(&self) -> &Arc<B> {
        &self.breaker
    }

    /// Runs the invoker, at most once, through the breaker.
    /// The invoker's error comes back as `CircuitBreakerError::Failed`, untouched.
    /// If the breaker denies the call, the handler is called and
    /// `CircuitBreakerError::Open` returned.
    pub fn intercept<C, Req, Reply, O, I, E>(
        &self,
        ctx: &C,
        method: &str,
        req: &Req,
        reply: &mut Reply,
        opts: &[O],
        invoker: I) -> Result<(), CircuitBreakerError<E>>
        where C: ?Sized,
              Req: ?Sized,
              Reply: ?Sized,
              H: OpenStateHandler<C, Req>,
              I: FnOnce(&C, &str, &Req, &mut Reply, &[O]) -> Result<(), E>,
              E: Error + 'static
    {
        let result = self.breaker.call(|| invoker(ctx, method, req, reply, opts));
        if let Err(CircuitBreakerError::Open) = result {
            debug!("[UnaryInterceptor::intercept({})] denied, breaker is {}.",
                method, self.breaker.state());
            self.handler.handle(ctx, method, req);
        }
        result
    }
}
