use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use silkmall_client::clock::SystemClock;
use silkmall_client::config::{ClientConfig, ConfigError};
use silkmall_client::net::api::{self, RegisterError};
use silkmall_client::net::http::{ApiError, HttpTransport};
use silkmall_client::net::types::{LoginPayload, RegisterPayload, Role};
use silkmall_client::router::routes::AUTH_ENTRY_PATH;
use silkmall_client::router::{GuardDecision, MemoryNavigator, RouteTable, Router};
use silkmall_client::state::session::{Session, SessionHandle, StorageKeys};
use silkmall_client::storage::{FileStore, MemoryStore};


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Register(#[from] RegisterError),
    #[error("signed in; run `logout` before browsing as a guest")]
    SignedIn,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "silkmall", about = "SilkMall marketplace session CLI")]
struct Cli {
    #[arg(long, env = "SILKMALL_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SILKMALL_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Location the session is "on" before the command runs.
    #[arg(long, default_value = "/")]
    from: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a login captcha challenge.
    Captcha,
    Login(LoginArgs),
    Register(RegisterArgs),
    ForgotPassword {
        email: String,
    },
    Logout,
    Guest(GuestCommand),
    /// Print the stored session and its authorization facts.
    Status,
    /// Run a navigation through the route guard and print where it lands.
    Navigate {
        target: String,
        /// Enter guest mode first. Refused while signed in.
        #[arg(long, default_value_t = false)]
        guest: bool,
    },
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "SILKMALL_PASSWORD")]
    password: String,
    #[arg(long)]
    challenge_id: String,
    #[arg(long)]
    code: String,
    /// Post-login destination, as carried by the login page's `redirect` query.
    #[arg(long)]
    redirect: Option<String>,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long, env = "SILKMALL_PASSWORD")]
    password: String,
    #[arg(long)]
    confirm_password: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long, default_value = "consumer")]
    user_type: String,
    #[arg(long)]
    company_name: Option<String>,
}

#[derive(Args, Debug)]
struct GuestCommand {
    #[command(subcommand)]
    command: GuestSubcommand,
}

#[derive(Subcommand, Debug)]
enum GuestSubcommand {
    Enter,
    Exit,
}

struct CliContext {
    transport: HttpTransport,
    router: Router,
}

impl CliContext {
    fn session(&self) -> &SessionHandle {
        self.transport.session()
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url;
    }
    if let Some(state_dir) = cli.state_dir {
        config.state_dir = state_dir;
    }

    let ctx = build_context(&config, &cli.from);
    tracing::debug!(api = %config.api_base_url, state_dir = %config.state_dir.display(), "silkmall cli ready");

    match cli.command {
        Command::Captcha => run_captcha(&ctx).await,
        Command::Login(args) => run_login(&ctx, args).await,
        Command::Register(args) => run_register(&ctx, args).await,
        Command::ForgotPassword { email } => {
            let message = api::request_password_reset(&ctx.transport, &email).await?;
            println!("{message}");
            Ok(())
        }
        Command::Logout => {
            ctx.session().lock().clear_auth();
            println!("signed out");
            Ok(())
        }
        Command::Guest(guest) => {
            run_guest(&ctx, guest);
            Ok(())
        }
        Command::Status => run_status(&ctx),
        Command::Navigate { target, guest } => run_navigate(&ctx, &target, guest),
    }
}

fn build_context(config: &ClientConfig, from: &str) -> CliContext {
    let durable = Arc::new(FileStore::new(config.state_dir.join(format!("{}.json", config.app_key))));
    let transient = Arc::new(MemoryStore::new());
    let session = Session::open(durable, transient, StorageKeys::from(config), Arc::new(SystemClock));
    let navigator = Arc::new(MemoryNavigator::new(from));
    let transport = HttpTransport::new(config, SessionHandle::new(session), navigator.clone(), AUTH_ENTRY_PATH);
    let router = Router::new(RouteTable::marketplace(), navigator);
    CliContext { transport, router }
}

async fn run_captcha(ctx: &CliContext) -> Result<(), CliError> {
    let challenge = api::request_captcha(&ctx.transport).await?;
    print_json(&json!({
        "challengeId": challenge.challenge_id,
        "question": challenge.question,
        "expiresIn": challenge.expires_in,
    }))
}

async fn run_login(ctx: &CliContext, args: LoginArgs) -> Result<(), CliError> {
    let payload = LoginPayload {
        username: args.username,
        password: args.password,
        challenge_id: args.challenge_id,
        verification_code: args.code,
    };
    let outcome = api::sign_in(&ctx.transport, &payload, args.redirect.as_deref()).await?;
    let navigation = ctx.router.navigate(ctx.session(), &outcome.landing);
    print_json(&json!({
        "username": outcome.user.username,
        "role": outcome.user.role().as_str(),
        "landing": navigation.location.full_path(),
    }))
}

async fn run_register(ctx: &CliContext, args: RegisterArgs) -> Result<(), CliError> {
    let payload = RegisterPayload {
        username: args.username,
        password: args.password,
        confirm_password: args.confirm_password,
        email: args.email,
        phone: args.phone,
        user_type: Role::from(args.user_type),
        company_name: args.company_name,
    };
    let message = api::register(&ctx.transport, &payload).await?;
    println!("{message}");
    Ok(())
}

fn run_guest(ctx: &CliContext, guest: GuestCommand) {
    let mut session = ctx.session().lock();
    match guest.command {
        GuestSubcommand::Enter => session.enter_guest_mode(),
        GuestSubcommand::Exit => session.exit_guest_mode(),
    }
    println!("guest={}", session.is_guest_session());
}

fn run_status(ctx: &CliContext) -> Result<(), CliError> {
    let session = ctx.session().lock();
    let facts = session.facts();
    let record = session.record();
    print_json(&json!({
        "authenticated": facts.authenticated,
        "guest": facts.guest,
        "role": facts.role.as_ref().map(Role::as_str),
        "username": record.user.as_ref().map(|user| user.username.as_str()),
        "expiresAt": record.expires_at,
        "redirectUrl": record.redirect_url,
    }))
}

fn run_navigate(ctx: &CliContext, target: &str, guest: bool) -> Result<(), CliError> {
    if guest {
        enter_guest_if_signed_out(ctx.session())?;
    }
    let navigation = ctx.router.navigate(ctx.session(), target);
    let decision = match navigation.decision {
        GuardDecision::Proceed => "proceed",
        GuardDecision::RedirectToAuth(_) => "redirect-to-auth",
        GuardDecision::RedirectToRoleHome(_) => "redirect-to-role-home",
    };
    print_json(&json!({
        "decision": decision,
        "location": navigation.location.full_path(),
    }))
}

/// Guest mode discards the stored login, so it is never entered implicitly
/// over a live one.
fn enter_guest_if_signed_out(session: &SessionHandle) -> Result<(), CliError> {
    let mut session = session.lock();
    if session.is_authenticated() {
        return Err(CliError::SignedIn);
    }
    session.enter_guest_mode();
    Ok(())
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
