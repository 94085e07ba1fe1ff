//! Dispatcher behavior for single calls.

use std::sync::{Arc, Mutex};
use weave::{Aspect, BoxError, InvokeError, Value, args, boxed, parse, testing::Journal};

mod common;
use common::{Account, CallCounter, TripWire, dispatcher, find_accounts_sig, two_accounts};

#[test]
fn test_around_substitute_skips_target() {
    let counter = CallCounter::default();
    let d = dispatcher([Aspect::builder("Cache")
        .around(parse("execution(* dao.*.findAccounts(..))").unwrap(), |_| {
            Ok(boxed(vec![Account::new("Cached", "Gold")]))
        })
        .build()]);

    let c = counter.clone();
    let accounts: Vec<Account> = d
        .invoke(&find_accounts_sig(), args![false], move || {
            c.hit();
            Ok(two_accounts())
        })
        .unwrap();

    assert_eq!(accounts, [Account::new("Cached", "Gold")]);
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_after_returning_mutation_is_returned() {
    let d = dispatcher([Aspect::builder("Upper")
        .after_returning(
            parse("execution(* dao.*.findAccounts(..))").unwrap(),
            |_, result: &mut dyn Value| {
                if let Some(accounts) = result.downcast_mut::<Vec<Account>>() {
                    accounts
                        .iter_mut()
                        .for_each(|a| a.name = a.name.to_uppercase());
                }
                Ok(())
            },
        )
        .build()]);

    let accounts: Vec<Account> = d
        .invoke(&find_accounts_sig(), args![false], || Ok(two_accounts()))
        .unwrap();
    let names: Vec<_> = accounts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["JOHN", "MADHU"]);
}

#[test]
fn test_failure_reaches_observers_and_caller_unchanged() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let finally = CallCounter::default();
    let (s1, s2, f) = (seen.clone(), seen.clone(), finally.clone());
    let pc = || parse("execution(* dao.*.findAccounts(..))").unwrap();

    let d = dispatcher([
        Aspect::builder("A1")
            .order(1)
            .after_throwing(pc(), move |_, failure| {
                s1.lock().unwrap().push(failure.downcast_ref::<TripWire>().cloned());
                Ok(())
            })
            .after(pc(), move |_| {
                f.hit();
                Ok(())
            })
            .build(),
        Aspect::builder("A2")
            .order(2)
            .after_throwing(pc(), move |_, failure| {
                s2.lock().unwrap().push(failure.downcast_ref::<TripWire>().cloned());
                Ok(())
            })
            .build(),
    ]);

    let err = d
        .invoke(&find_accounts_sig(), args![true], || -> Result<Vec<Account>, BoxError> {
            Err(Box::new(TripWire { code: 7 }))
        })
        .unwrap_err();

    assert_eq!(
        err.as_target().and_then(|e| e.downcast_ref::<TripWire>()),
        Some(&TripWire { code: 7 })
    );
    assert_eq!(
        *seen.lock().unwrap(),
        [Some(TripWire { code: 7 }), Some(TripWire { code: 7 })]
    );
    assert_eq!(finally.count(), 1);
}

#[test]
fn test_find_accounts_scenario() {
    let journal = Journal::new();
    let pc = || parse("execution(* dao.*.findAccounts(*))").unwrap();
    let (j1, j2, j3, j4) = (journal.clone(), journal.clone(), journal.clone(), journal.clone());

    let d = dispatcher([Aspect::builder("MyDemoLoggingAspect")
        .order(2)
        .before(pc(), move |jp| {
            j1.push(format!("before {:?}", jp.args().get::<bool>(0)));
            Ok(())
        })
        .after(pc(), move |_| {
            j2.push("after");
            Ok(())
        })
        .after_throwing(pc(), move |_, exc| {
            j3.push(format!("after_throwing {exc}"));
            Ok(())
        })
        .after_returning(pc(), move |_, result: &mut dyn Value| {
            if let Some(accounts) = result.downcast_mut::<Vec<Account>>() {
                for account in accounts.iter_mut() {
                    account.name = account.name.to_uppercase();
                }
            }
            j4.push("after_returning");
            Ok(())
        })
        .build()]);

    let find = |trip_wire: bool| {
        d.invoke(&find_accounts_sig(), args![trip_wire], move || {
            if trip_wire {
                return Err(Box::new(TripWire { code: 1 }) as BoxError);
            }
            Ok(two_accounts())
        })
    };

    let accounts = find(false).unwrap();
    assert_eq!(
        accounts,
        [Account::new("JOHN", "Silver"), Account::new("MADHU", "Platinum")]
    );
    assert_eq!(
        journal.entries(),
        ["before Some(false)", "after", "after_returning"]
    );

    journal.clear();
    let err = find(true).unwrap_err();
    assert!(matches!(err, InvokeError::Target(_)));
    assert_eq!(err.to_string(), "No soup for you!!! (code 1)");
    assert_eq!(
        journal.entries(),
        [
            "before Some(true)",
            "after",
            "after_throwing No soup for you!!! (code 1)",
        ]
    );
}

#[test]
fn test_param_pattern_restricts_arity() {
    let counter = CallCounter::default();
    let c = counter.clone();
    let d = dispatcher([Aspect::builder("OneArg")
        .before(parse("execution(* dao.*.findAccounts(*))").unwrap(), move |_| {
            c.hit();
            Ok(())
        })
        .build()]);

    let no_params = weave::CallSignature::new("dao.AccountDAO", "findAccounts");
    let _: () = d.invoke(&no_params, args![], || Ok(())).unwrap();
    assert_eq!(counter.count(), 0);

    let _: () = d.invoke(&find_accounts_sig(), args![true], || Ok(())).unwrap();
    assert_eq!(counter.count(), 1);
}

#[test]
fn test_before_failure_skips_target() {
    let counter = CallCounter::default();
    let d = dispatcher([Aspect::builder("Guard")
        .before(parse("forDaoPackage()").unwrap(), |jp| {
            Err(format!("{} is not allowed", jp.signature().method()).into())
        })
        .build()]);

    let c = counter.clone();
    let err = d
        .invoke(
            &common::demo_sig("AccountDAO", "addAccount"),
            args![Account::new("Madhu", "Platinum"), true],
            move || {
                c.hit();
                Ok(())
            },
        )
        .unwrap_err();

    assert!(matches!(err, InvokeError::Before { ref aspect, .. } if aspect == "Guard"));
    assert_eq!(err.to_string(), "before advice of aspect `Guard` failed: addAccount is not allowed");
    assert_eq!(counter.count(), 0);
}

#[test]
fn test_second_proceed_is_reported() {
    let counter = CallCounter::default();
    let d = dispatcher([Aspect::builder("Retry")
        .around(parse("forDaoPackage()").unwrap(), |pjp| {
            let _ = pjp.proceed();
            pjp.proceed()
        })
        .build()]);

    let c = counter.clone();
    let err = d
        .invoke(&common::demo_sig("AccountDAO", "doWork"), args![], move || {
            c.hit();
            Ok(false)
        })
        .unwrap_err();

    assert!(matches!(err, InvokeError::ProceedMisuse { ref aspect, .. } if aspect == "Retry"));
    assert_eq!(counter.count(), 1);
}
