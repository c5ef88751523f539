use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use als_core::{
    aggregator::Aggregator,
    config::Config,
    diagnostics::test_connection,
    dispatcher::Dispatcher,
    domain::ChatId,
    messaging::port::MessagingPort,
    pipeline::DigestRun,
    report::ReportBuilder,
    scheduler::ReportScheduler,
    sources::FeedRegistry,
    summarizer::Summarizer,
};
use als_feeds::HttpFeedFetcher;
use als_openai::OpenAiClient;
use als_telegram::TelegramMessenger;

#[derive(Parser, Debug)]
#[command(
    name = "als",
    version,
    about = "Daily AI paper and news digest, delivered to Telegram"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Deliver reports on the configured schedule (default)
    Run,
    /// Build and deliver one report, then exit
    Once,
    /// Build one report and print it without sending
    Preview,
    /// Check the bot token and send a test message
    TestConnection,
    /// Print the chat of the most recent update the bot received
    DiscoverChat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    als_core::logging::init("als")?;

    let cfg = Config::load()?;
    let messenger = Arc::new(TelegramMessenger::new(cfg.telegram_bot_token.clone()));

    match cli.command.unwrap_or(Command::Run) {
        Command::Preview => {
            let builder = report_builder(&cfg)?;
            println!("{}", builder.build().await);
        }
        Command::DiscoverChat => match messenger.recent_chat().await? {
            Some(chat) => {
                let who = chat.user_name.as_deref().unwrap_or("unknown user");
                println!("chat id: {} ({who})", chat.chat_id.0);
            }
            None => bail!("no recent messages found; send /start to the bot and try again"),
        },
        Command::TestConnection => {
            let chat_id = cfg.chat_target.resolve(messenger.as_ref()).await?;
            let status = test_connection(messenger.as_ref(), chat_id).await;
            if !status.is_ok() {
                let hint = status.remediation_hint().unwrap_or_default();
                bail!("connection test failed: {status:?}. {hint}");
            }
            println!("connection ok");
        }
        Command::Once => {
            let chat_id = cfg.chat_target.resolve(messenger.as_ref()).await?;
            let run = digest_run(&cfg, messenger, chat_id)?;
            let summary = run.run_once().await;
            if summary.delivered() < summary.outcomes.len() {
                warn!(
                    delivered = summary.delivered(),
                    parts = summary.outcomes.len(),
                    "some report parts were not delivered"
                );
            }
        }
        Command::Run => {
            let chat_id = cfg.chat_target.resolve(messenger.as_ref()).await?;
            let run = Arc::new(digest_run(&cfg, messenger, chat_id)?);
            let scheduler = ReportScheduler::new(&cfg.report_cron, run, cfg.run_on_startup)?;

            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

            info!(cron = %cfg.report_cron, chat_id = chat_id.0, "scanner started");
            scheduler.run_until_cancelled(cancel).await;
        }
    }

    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("shutdown requested");
            cancel.cancel();
        }
        Err(e) => warn!(error = %e, "cannot listen for ctrl-c"),
    }
}

fn report_builder(cfg: &Config) -> anyhow::Result<Arc<ReportBuilder>> {
    let fetcher = Arc::new(HttpFeedFetcher::new(cfg.feed_timeout)?);
    let completion = Arc::new(OpenAiClient::new(
        cfg.openai_api_key.clone(),
        cfg.openai_model.clone(),
        cfg.openai_base_url.clone(),
        cfg.completion_timeout,
    )?);

    let aggregator = Arc::new(Aggregator::new(FeedRegistry::default(), fetcher));
    let summarizer = Arc::new(Summarizer::new(completion, cfg.summary_language.clone()));
    Ok(Arc::new(ReportBuilder::new(aggregator, summarizer)))
}

fn digest_run(
    cfg: &Config,
    messenger: Arc<TelegramMessenger>,
    chat_id: ChatId,
) -> anyhow::Result<DigestRun> {
    let builder = report_builder(cfg)?;
    let dispatcher = Arc::new(Dispatcher::new(messenger, chat_id));
    Ok(DigestRun::new(builder, dispatcher))
}
