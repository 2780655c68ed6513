use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use dyn_adapter::{
    adapter_factory, create_adapter, create_typed, export_type, Handler, RuntimeError, Value,
};

#[test]
fn sum_adapter_round_trips_value_types() -> anyhow::Result<()> {
    let add = create_typed::<(i32, i32), i32, _>(|args| {
        let a = *args[0].downcast_ref::<i32>()?;
        let b = *args[1].downcast_ref::<i32>()?;
        Ok(Value::new(a + b))
    })?
    .expect("adapter has the requested shape");

    assert_eq!(add.call(2, 3)?, 5);
    assert_eq!(add.call(-7, 7)?, 0);
    Ok(())
}

#[test]
fn handler_sees_arguments_boxed_in_declaration_order() -> anyhow::Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let invocations = Arc::new(AtomicUsize::new(0));

    let adapter = {
        let seen = seen.clone();
        let invocations = invocations.clone();
        create_typed::<(i32, String, bool), i64, _>(move |args| {
            invocations.fetch_add(1, Ordering::SeqCst);
            let mut log = seen.lock().unwrap();
            for arg in args {
                log.push(arg.ty().name().to_string());
            }
            Ok(Value::new(i64::from(*args[0].downcast_ref::<i32>()?)))
        })?
        .expect("adapter has the requested shape")
    };

    assert_eq!(adapter.call(9, "mid".to_string(), true)?, 9);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["i32", "alloc::string::String", "bool"]
    );
    Ok(())
}

#[test]
fn void_adapter_records_argument_and_returns_nothing() -> anyhow::Result<()> {
    let recorded = Arc::new(Mutex::new(Vec::new()));

    let record = {
        let recorded = recorded.clone();
        create_typed::<(String,), (), _>(move |args| {
            recorded
                .lock()
                .unwrap()
                .push(args[0].downcast_ref::<String>()?.clone());
            Ok(Value::unit())
        })?
        .expect("adapter has the requested shape")
    };

    record.call("x".to_string())?;
    assert_eq!(*recorded.lock().unwrap(), vec!["x".to_string()]);
    Ok(())
}

#[test]
fn zero_parameter_adapter_still_invokes_the_handler() -> anyhow::Result<()> {
    let invocations = Arc::new(AtomicUsize::new(0));

    let nullary = {
        let invocations = invocations.clone();
        create_typed::<(), u64, _>(move |args| {
            assert!(args.is_empty());
            invocations.fetch_add(1, Ordering::SeqCst);
            Ok(Value::new(11u64))
        })?
        .expect("adapter has the requested shape")
    };

    assert_eq!(nullary.call()?, 11);
    assert_eq!(nullary.call()?, 11);
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn factories_are_behaviorally_idempotent() -> anyhow::Result<()> {
    let a = adapter_factory::<(f64,), f64>()?;
    let b = adapter_factory::<(f64,), f64>()?;
    assert_eq!(a.signature(), b.signature());

    let halve = a
        .bind(|args| Ok(Value::new(args[0].downcast_ref::<f64>()? / 2.0)))
        .downcast::<(f64,), f64>()
        .expect("adapter has the requested shape");
    let square = b
        .bind(|args| {
            let x = *args[0].downcast_ref::<f64>()?;
            Ok(Value::new(x * x))
        })
        .downcast::<(f64,), f64>()
        .expect("adapter has the requested shape");

    assert_eq!(halve.call(8.0)?, 4.0);
    assert_eq!(square.call(8.0)?, 64.0);
    Ok(())
}

#[test]
fn one_handler_can_back_several_adapters() -> anyhow::Result<()> {
    let shared: Handler = Arc::new(|args| {
        let s = args[0].downcast_ref::<String>()?;
        Ok(Value::new(s.len() as u64))
    });

    let factory = adapter_factory::<(String,), u64>()?;
    let first = factory
        .bind_handler(shared.clone())
        .downcast::<(String,), u64>()
        .expect("adapter has the requested shape");
    let second = factory
        .bind_handler(shared)
        .downcast::<(String,), u64>()
        .expect("adapter has the requested shape");

    assert_eq!(first.call("four".to_string())?, 4);
    assert_eq!(second.call("x".to_string())?, 1);
    Ok(())
}

#[test]
fn unexported_types_fail_synthesis_until_exported() -> anyhow::Result<()> {
    struct Opaque {
        weight: u32,
    }

    let err = adapter_factory::<(Opaque,), u32>().unwrap_err();
    assert_eq!(err.hidden_types().len(), 1);
    assert!(err.hidden_types()[0].ends_with("Opaque"));
    assert!(err.to_string().contains("Opaque"));

    export_type::<Opaque>();
    let weigh = create_typed::<(Opaque,), u32, _>(|args| {
        Ok(Value::new(args[0].downcast_ref::<Opaque>()?.weight))
    })?
    .expect("adapter has the requested shape");
    assert_eq!(weigh.call(Opaque { weight: 3 })?, 3);
    Ok(())
}

#[test]
fn dynamic_call_validates_and_forwards() -> anyhow::Result<()> {
    let adapter = create_adapter::<(i32, i32), i32, _>(|args| {
        let a = *args[0].downcast_ref::<i32>()?;
        let b = *args[1].downcast_ref::<i32>()?;
        Ok(Value::new(a * b))
    })?;

    assert_eq!(adapter.param_arity(), 2);
    let out = adapter
        .call(&[Value::new(6i32), Value::new(7i32)])?
        .expect("signature declares a result");
    assert_eq!(out.downcast::<i32>()?, 42);

    assert!(matches!(
        adapter.call(&[Value::new(6i32)]).unwrap_err(),
        RuntimeError::ArityMismatch { .. }
    ));
    assert!(matches!(
        adapter
            .call(&[Value::new(6i32), Value::new(7u32)])
            .unwrap_err(),
        RuntimeError::ArgumentType { index: 1, .. }
    ));
    Ok(())
}

#[test]
fn downcast_to_a_different_shape_is_none() -> anyhow::Result<()> {
    let adapter = create_adapter::<(bool,), bool, _>(|args| {
        Ok(Value::new(!args[0].downcast_ref::<bool>()?))
    })?;

    assert!(adapter.downcast::<(bool,), i32>().is_none());
    assert!(adapter.downcast::<(i32,), bool>().is_none());

    let not = adapter
        .downcast::<(bool,), bool>()
        .expect("adapter has the requested shape");
    assert!(not.call(false)?);
    Ok(())
}

#[test]
fn concurrent_cold_start_binds_independent_handlers() -> anyhow::Result<()> {
    const THREADS: usize = 16;

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            thread::spawn(move || -> anyhow::Result<()> {
                let offset = i as i64;
                let adapter = create_typed::<(i64, i64, i64, i64), i64, _>(move |args| {
                    let mut sum = offset;
                    for arg in args {
                        sum += *arg.downcast_ref::<i64>()?;
                    }
                    Ok(Value::new(sum))
                })?
                .expect("adapter has the requested shape");

                for round in 0..100i64 {
                    assert_eq!(adapter.call(round, 1, 2, 3)?, round + 6 + offset);
                }
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap()?;
    }
    Ok(())
}

#[test]
fn handler_errors_propagate_to_the_caller() -> anyhow::Result<()> {
    let faulty = create_typed::<(i32,), i32, _>(|args| {
        let n = *args[0].downcast_ref::<i32>()?;
        if n < 0 {
            return Err(RuntimeError::new("negative input"));
        }
        Ok(Value::new(n))
    })?
    .expect("adapter has the requested shape");

    assert_eq!(faulty.call(5)?, 5);
    let err = faulty.call(-1).unwrap_err();
    assert_eq!(err.to_string(), "negative input");
    Ok(())
}
