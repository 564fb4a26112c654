use rpc_circuit_breaker::{BreakerConfig, CircuitBreaker, CircuitState, ThresholdBreaker, UnaryInterceptor};
use log::info;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;
use thiserror::Error;
use std::thread::sleep;

/// The error a remote call reports.
#[derive(Error, Debug)]
enum RpcError {
    #[error("rpc error: code = Internal desc = {0}")]
    Internal(String)
}

/// A greeter service failing the first calls it gets.
struct Greeter {
    during_error: i32,
    counter: AtomicI32,
}

impl Greeter {
    fn say_hello(&self, name: &str) -> Result<String, RpcError> {
        let counter = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        info!("[Server] Request handled.");
        let left = self.during_error - counter;
        if left >= 0 {
            return Err(RpcError::Internal(format!("fail {} times left", left)));
        }
        Ok(format!("Hello {}", name))
    }
}

/// Per call context, as the transport would hand it over.
struct Context;

fn main() {
    env_logger::init();

    let greeter = Greeter { during_error: 5, counter: AtomicI32::new(0) };
    let config = BreakerConfig::new()
        .with_counter_reset_interval(Duration::from_secs(60))
        .with_trip_threshold(3)
        .with_open_timeout(Duration::from_millis(250))
        .with_half_open_max_successes(3);
    let breaker = match ThresholdBreaker::new("greeter", config) {
        Ok(breaker) => Arc::new(breaker.with_listener(|name: &str, from: CircuitState, to: CircuitState| {
            info!("[Client] Breaker {} moved from {} to {}.", name, from, to)
        })),
        Err(err) => panic!("Invalid configuration: {}", err)
    };
    let interceptor = UnaryInterceptor::new(Arc::clone(&breaker),
        |_: &Context, method: &str, _: &String| info!("[Client] Circuit breaker is open, {} not called.", method));

    for _i in 0..20 {
        sleep(Duration::from_millis(100));
        let mut response = None;
        let result = interceptor.intercept(&Context, "/helloworld.Greeter/SayHello",
            &String::from("foo"), &mut response, &[] as &[()],
            |_: &Context, _: &str, req: &String, reply: &mut Option<String>, _: &[()]| -> Result<(), RpcError> {
                *reply = Some(greeter.say_hello(req)?);
                Ok(())
            });
        match result {
            Ok(()) => info!("[Client] Response = {:?}, cb.state() = {}", response, breaker.state()),
            Err(err) => info!("[Client] Response = {:?}, cb.state() = {}, Err = {}", response, breaker.state(), err)
        }
    }
}
