//! Demo programs for the interception engine.
//!
//! Account and membership DAOs and a traffic fortune service are woven with
//! the `MyDemoLoggingAspect` aspect at order 2. Each subcommand reproduces one
//! scenario:
//!
//! - `main`: before advice on DAO business methods, accessors excluded
//! - `after-returning`: results of `findAccounts` are rewritten in place
//! - `after-throwing`: the failure of `findAccounts` is observed and re-raised
//! - `around`: the fortune service is timed, failures logged and re-raised
//!
//! Set `WEAVE_LOG` to change the log filter (default `info`).

use clap::{ArgAction, Parser, Subcommand};
use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weave::{
    Advice, AdviceRegistry, Aspect, BoxError, CallSignature, Dispatcher, InvokeError,
    LoggingAdvice, Pointcut, PointcutMatcher, TimingAdvice, Value, args, parse,
};

const DAO: &str = "com.luv2code.aopdemo.dao";
const SERVICE: &str = "com.luv2code.aopdemo.service";

// ============================================================================
// CLI
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "aop-demo", version, about = "Run the interception demo programs")]
struct Cli {
    /// Also log every DAO call with the standard logging advice.
    #[arg(long, global = true)]
    log_calls: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Call DAO business methods and accessors.
    Main,
    /// Find accounts and print the rewritten result.
    AfterReturning,
    /// Find accounts with the trip wire set.
    AfterThrowing {
        /// Make the DAO fail.
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        trip_wire: bool,
    },
    /// Ask the fortune service for today's traffic.
    Around {
        /// Make the service fail.
        #[arg(long)]
        trip_wire: bool,

        /// Simulated service latency in milliseconds.
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("WEAVE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// ============================================================================
// Targets
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Account {
    name: String,
    level: String,
}

impl Account {
    fn new(name: &str, level: &str) -> Self {
        Self {
            name: name.to_string(),
            level: level.to_string(),
        }
    }
}

struct AccountDao {
    weaver: Arc<Dispatcher>,
    name: Option<String>,
    service_code: Option<String>,
}

impl AccountDao {
    const OWNER: &'static str = "AccountDAO";

    fn new(weaver: Arc<Dispatcher>) -> Self {
        Self {
            weaver,
            name: None,
            service_code: None,
        }
    }

    fn sig(method: &str, params: &[&str]) -> CallSignature {
        CallSignature::new(format!("{DAO}.{}", Self::OWNER), method)
            .with_params(params.iter().copied())
    }

    fn add_account(&self, account: &Account, vip: bool) -> Result<(), InvokeError> {
        let sig = Self::sig("addAccount", &["Account", "boolean"]);
        self.weaver.invoke(&sig, args![account.clone(), vip], || {
            println!("{}: DOING MY DB WORK: ADDING AN ACCOUNT", Self::OWNER);
            Ok(())
        })
    }

    fn do_work(&self) -> Result<bool, InvokeError> {
        self.weaver.invoke(&Self::sig("doWork", &[]), args![], || {
            println!("{}: doWork()", Self::OWNER);
            Ok(false)
        })
    }

    fn set_name(&mut self, name: &str) -> Result<(), InvokeError> {
        let sig = Self::sig("setName", &["String"]);
        self.weaver.invoke(&sig, args![name.to_string()], || {
            println!("{}: in setName()", Self::OWNER);
            self.name = Some(name.to_string());
            Ok(())
        })
    }

    fn name(&self) -> Result<Option<String>, InvokeError> {
        self.weaver.invoke(&Self::sig("getName", &[]), args![], || {
            println!("{}: in getName()", Self::OWNER);
            Ok(self.name.clone())
        })
    }

    fn set_service_code(&mut self, code: &str) -> Result<(), InvokeError> {
        let sig = Self::sig("setServiceCode", &["String"]);
        self.weaver.invoke(&sig, args![code.to_string()], || {
            println!("{}: in setServiceCode()", Self::OWNER);
            self.service_code = Some(code.to_string());
            Ok(())
        })
    }

    fn service_code(&self) -> Result<Option<String>, InvokeError> {
        self.weaver.invoke(&Self::sig("getServiceCode", &[]), args![], || {
            println!("{}: in getServiceCode()", Self::OWNER);
            Ok(self.service_code.clone())
        })
    }

    fn find_accounts(&self, trip_wire: bool) -> Result<Vec<Account>, InvokeError> {
        let sig = Self::sig("findAccounts", &["boolean"]);
        self.weaver.invoke(&sig, args![trip_wire], || {
            if trip_wire {
                return Err("No soup for you!!!".into());
            }
            Ok(vec![
                Account::new("John", "Silver"),
                Account::new("Madhu", "Platinum"),
                Account::new("Luca", "Gold"),
            ])
        })
    }
}

struct MembershipDao {
    weaver: Arc<Dispatcher>,
}

impl MembershipDao {
    const OWNER: &'static str = "MembershipDAO";

    fn sig(method: &str) -> CallSignature {
        CallSignature::new(format!("{DAO}.{}", Self::OWNER), method)
    }

    fn add_silly_member(&self) -> Result<bool, InvokeError> {
        self.weaver.invoke(&Self::sig("addSillyMember"), args![], || {
            println!("{}: DOING STUFF: ADDING A MEMBERSHIP ACCOUNT", Self::OWNER);
            Ok(true)
        })
    }

    fn go_to_sleep(&self) -> Result<(), InvokeError> {
        self.weaver.invoke(&Self::sig("goToSleep"), args![], || {
            println!("{}: I'm going to sleep now...", Self::OWNER);
            Ok(())
        })
    }
}

struct TrafficFortuneService {
    weaver: Arc<Dispatcher>,
    delay: Duration,
}

impl TrafficFortuneService {
    fn fortune(&self, trip_wire: bool) -> Result<String, InvokeError> {
        let sig = CallSignature::new(format!("{SERVICE}.TrafficFortuneService"), "getFortune")
            .with_params(["boolean"]);
        self.weaver.invoke(&sig, args![trip_wire], || {
            thread::sleep(self.delay);
            if trip_wire {
                return Err("Major accident! Highway is closed!".into());
            }
            Ok("Expect heavy traffic this morning".to_string())
        })
    }
}

// ============================================================================
// Aspects
// ============================================================================

fn demo_matcher() -> Result<PointcutMatcher, BoxError> {
    Ok(PointcutMatcher::builder()
        .define("forDaoPackage", parse(&format!("execution(* {DAO}.*.*(..))"))?)
        .define("getter", parse(&format!("execution(* {DAO}.*.get*(..))"))?)
        .define("setter", parse(&format!("execution(* {DAO}.*.set*(..))"))?)
        .define(
            "forDaoPackageNoGetterSetter",
            parse("forDaoPackage() && !(getter() || setter())")?,
        )
        .build()?)
}

fn logging_aspect() -> Result<Aspect, BoxError> {
    let find_accounts = parse(&format!("execution(* {DAO}.AccountDAO.findAccounts(..))"))?;

    Ok(Aspect::builder("MyDemoLoggingAspect")
        .order(2)
        .around(
            parse(&format!("execution(* {SERVICE}.*.getFortune(..))"))?,
            |pjp| {
                let method = pjp.signature().to_short_string();
                info!("=====>> Executing @Around on method: {method}");

                let begin = Instant::now();
                let result = pjp.proceed().inspect_err(|err| warn!("{err}"))?;
                info!(
                    "======> Duration: {} seconds",
                    begin.elapsed().as_secs_f64()
                );
                Ok(result)
            },
        )
        .after(find_accounts.clone(), |jp| {
            let method = jp.signature().to_short_string();
            info!("=====>> Executing @After (finally) on method: {method}");
            Ok(())
        })
        .after_throwing(find_accounts.clone(), |jp, failure| {
            let method = jp.signature().to_short_string();
            info!("=====>> Executing @AfterThrowing on method: {method}");
            info!("=====>> The exception is: {failure}");
            Ok(())
        })
        .after_returning(find_accounts, |jp, result: &mut dyn Value| {
            let method = jp.signature().to_short_string();
            info!("=====>> Executing @AfterReturning on method: {method}");
            info!("=====>> result is: {result:?}");

            if let Some(accounts) = result.downcast_mut::<Vec<Account>>() {
                for account in accounts.iter_mut() {
                    account.name = account.name.to_uppercase();
                }
            }
            info!("======>> result is: {result:?}");
            Ok(())
        })
        .before(parse("forDaoPackageNoGetterSetter()")?, |jp| {
            info!("==========>> Executing @Before advice on method");
            info!("Method: {}", jp.signature());

            for arg in jp.args().iter() {
                info!("Argument: {arg:?}");
                if let Some(account) = arg.downcast_ref::<Account>() {
                    info!("Account name: {}", account.name);
                    info!("Account level: {}", account.level);
                }
            }
            Ok(())
        })
        .build())
}

fn build_registry(log_calls: bool) -> Result<AdviceRegistry, BoxError> {
    let mut builder = AdviceRegistry::builder()
        .with_matcher(demo_matcher()?)
        .register(logging_aspect()?)
        .register(
            Aspect::builder("ServiceTiming")
                .order(1)
                .advise(
                    parse(&format!("execution(* {SERVICE}.*.*(..))"))?,
                    Advice::around(
                        TimingAdvice::new().with_threshold(Duration::from_secs(1)),
                    ),
                )
                .build(),
        );

    if log_calls {
        builder = builder.register_aspect(
            "CallLog",
            0,
            LoggingAdvice::named("dao").entries(Pointcut::named("forDaoPackage")),
        );
    }

    Ok(builder.build()?)
}

// ============================================================================
// Programs
// ============================================================================

fn main_demo(weaver: Arc<Dispatcher>) -> Result<(), BoxError> {
    let mut account_dao = AccountDao::new(weaver.clone());
    let membership_dao = MembershipDao { weaver };

    let account = Account::new("Madhu", "Platinum");
    account_dao.add_account(&account, true)?;
    account_dao.do_work()?;

    account_dao.set_name("foobar")?;
    account_dao.set_service_code("silver")?;

    let name = account_dao.name()?;
    let code = account_dao.service_code()?;
    info!(?name, ?code, "accessors returned");

    membership_dao.add_silly_member()?;
    membership_dao.go_to_sleep()?;
    Ok(())
}

fn after_returning_demo(weaver: Arc<Dispatcher>) -> Result<(), BoxError> {
    let accounts = AccountDao::new(weaver).find_accounts(false)?;

    println!("\n\nMain Program: AfterReturningDemoApp");
    println!("----");
    println!("{accounts:?}");
    println!();
    Ok(())
}

fn after_throwing_demo(weaver: Arc<Dispatcher>, trip_wire: bool) {
    let accounts = match AccountDao::new(weaver).find_accounts(trip_wire) {
        Ok(accounts) => Some(accounts),
        Err(err) => {
            println!("\n\nMain Program ... caught exception: {err}");
            None
        }
    };

    println!("\n\nMain Program: AfterThrowingDemoApp");
    println!("----");
    println!("{accounts:?}");
    println!();
}

fn around_demo(weaver: Arc<Dispatcher>, trip_wire: bool, delay: Duration) {
    let service = TrafficFortuneService { weaver, delay };

    println!("\nMain Program: AroundDemoApp");
    println!("Calling getFortune");
    match service.fortune(trip_wire) {
        Ok(fortune) => println!("\nMy fortune is: {fortune}"),
        Err(err) => println!("\nMain Program ... caught exception: {err}"),
    }
    println!("Finished");
}

fn main() -> Result<(), BoxError> {
    init_tracing();
    let cli = Cli::parse();

    let weaver = Arc::new(Dispatcher::new(build_registry(cli.log_calls)?));

    match cli.command {
        Command::Main => main_demo(weaver)?,
        Command::AfterReturning => after_returning_demo(weaver)?,
        Command::AfterThrowing { trip_wire } => after_throwing_demo(weaver, trip_wire),
        Command::Around {
            trip_wire,
            delay_ms,
        } => around_demo(weaver, trip_wire, Duration::from_millis(delay_ms)),
    }
    Ok(())
}
