//! Sharing one dispatcher across threads.

use std::sync::Arc;
use weave::{Aspect, Pointcut, Value, args, testing::Journal};

mod common;
use common::{Account, dispatcher, find_accounts_sig};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_invocations_do_not_interfere() {
    let journal = Journal::new();
    let d = Arc::new(dispatcher([Aspect::builder("Upper")
        .after_returning(Pointcut::atom("dao", "findAccounts"), |_, result: &mut dyn Value| {
            if let Some(accounts) = result.downcast_mut::<Vec<Account>>() {
                accounts
                    .iter_mut()
                    .for_each(|a| a.name = a.name.to_uppercase());
            }
            Ok(())
        })
        .after(Pointcut::atom("dao", "findAccounts"), journal.after("Upper"))
        .build()]));

    let mut tasks = Vec::new();
    for i in 0..32 {
        let d = d.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            let name = format!("user{i}");
            let accounts: Vec<Account> = d
                .invoke(&find_accounts_sig(), args![false], || {
                    Ok(vec![Account::new(&name, "Silver")])
                })
                .unwrap();
            (name, accounts)
        }));
    }

    for task in tasks {
        let (name, accounts) = task.await.unwrap();
        assert_eq!(accounts, [Account::new(&name.to_uppercase(), "Silver")]);
    }
    assert_eq!(journal.len(), 32);
}

#[test]
fn test_dispatcher_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<weave::Dispatcher>();
    assert_send_sync::<Arc<weave::Dispatcher>>();
}
