use eyre::Context;
use linkedin_connect::linkedin_api::{Collection, Locale, Paging, UserAuthorization};
use linkedin_connect::{
    AuthorizationScope, CallContext, Facade, JsonFileTokenStore, LinkedInConfig, PostHeader,
    PostPayload,
};
use std::io::IsTerminal;
use tokio_stream::StreamExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod redirect;

const DEFAULT_REDIRECT_PORT: u16 = 3000;
const TOKENS_FILE: &str = "tokens.json";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let config = LinkedInConfig::from_env().context("read LinkedIn configuration")?;
    let redirect_port = match std::env::var("LINKEDIN_REDIRECT_PORT") {
        Ok(port) => port.parse().context("parse LINKEDIN_REDIRECT_PORT")?,
        Err(_) => DEFAULT_REDIRECT_PORT,
    };
    let company_urn = std::env::var("LINKEDIN_COMPANY_URN").ok();
    let status_text = std::env::var("LINKEDIN_PUBLISH_STATUS").ok();

    let facade = Facade::new(config, JsonFileTokenStore::new(TOKENS_FILE))
        .context("set up LinkedIn client")?;
    if std::env::args().any(|arg| arg == "--log-off") {
        facade.log_off().await.context("clear stored token")?;
        eprintln!("==> signed out");
        return Ok(());
    }

    let user = match facade.current_user().await.context("read stored token")? {
        Some(user) => user,
        None => authorize(&facade, redirect_port).await?,
    };

    let mut ctx = CallContext::new();
    let me = facade.my_profile(&mut ctx, &user, None).await;
    if let Some(me) = &me {
        eprintln!("==> {} ({})", me.display_name(), me.urn());
        if let Some(size) = facade.first_degree_connections(&mut ctx, &user, &me.id).await {
            eprintln!("  connections: {}", size.first_degree_size);
        }
    }

    // shares and posts are listed for the company when one is given, else for the member
    let owner = company_urn
        .clone()
        .or_else(|| me.as_ref().map(|me| me.urn()));
    if let Some(owner) = &owner {
        let recent = ctx
            .attempt("stream shares", async {
                let shares = facade.api().stream_shares(&user, owner, 10);
                let mut shares = std::pin::pin!(shares);
                let mut recent = Vec::new();
                while let Some(share) = shares.next().await {
                    recent.push(share?);
                    if recent.len() == 5 {
                        break;
                    }
                }
                Ok::<_, linkedin_connect::Error>(recent)
            })
            .await
            .unwrap_or_default();
        eprintln!("==> recent shares of {owner}");
        for share in &recent {
            let text = share.text.as_ref().map(|t| t.text.as_str()).unwrap_or("");
            eprintln!("  {}: {text}", share.id);
        }

        if let Some(posts) = facade
            .ugc_posts(&mut ctx, &user, owner, Paging::new(0, 5))
            .await
        {
            eprintln!("==> {} UGC posts", posts.elements.len());
        }

        if let (Some(company), Some(first)) = (&company_urn, recent.first()) {
            let share_urn = format!("urn:li:share:{}", first.id);
            if let Some(stats) = facade
                .share_statistics(&mut ctx, &user, company, &share_urn)
                .await
            {
                for element in &stats.elements {
                    let totals = &element.total_share_statistics;
                    eprintln!(
                        "  {share_urn}: {} impressions, {} likes, {} clicks",
                        totals.impression_count, totals.like_count, totals.click_count
                    );
                }
            }
        }

        if let Some(text) = status_text {
            let payload = PostPayload::Status(PostHeader::new(owner.clone(), text));
            if let Some(urn) = facade.publish(&mut ctx, &user, &payload).await {
                eprintln!("==> published {urn}");
            }
        }
    }

    let targeting = facade
        .targeting_snapshot(&mut ctx, &user, &Locale::new("en", "US"))
        .await;
    eprintln!(
        "==> targeting: {} industries, {} job functions, {} seniorities, {} country groups",
        count(&targeting.industries),
        count(&targeting.job_functions),
        count(&targeting.seniorities),
        count(&targeting.country_groups),
    );

    let report = ctx.finish(());
    for timing in &report.timings {
        tracing::debug!(operation = timing.operation, elapsed = ?timing.elapsed, "timing");
    }
    if !report.errors.is_empty() {
        eprintln!("==> {} call(s) failed", report.errors.len());
        for error in &report.errors {
            eprintln!("  [{}] {}: {}", error.kind, error.operation, error.message);
        }
    }

    Ok(())
}

fn count<T>(collection: &Option<Collection<T>>) -> String {
    collection
        .as_ref()
        .map(|c| c.elements.len().to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Runs the authorization flow in the user's browser and stores the resulting token.
async fn authorize(
    facade: &Facade<JsonFileTokenStore>,
    redirect_port: u16,
) -> eyre::Result<UserAuthorization> {
    let (redirect_uri, eventually_callback) = redirect::listen(redirect_port, "/oauth2")
        .await
        .context("set up redirect endpoint")?;

    let scopes = AuthorizationScope::READ_BASIC_PROFILE
        | AuthorizationScope::READ_EMAIL_ADDRESS
        | AuthorizationScope::READ_WRITE_COMPANY_PAGE
        | AuthorizationScope::WRITE_SHARE;
    let mut flow = facade
        .start_authorization(scopes, &redirect_uri)
        .context("build authorization url")?;

    tracing::info!(url = %flow.authorization_url(), "asking user to follow OAuth flow");
    webbrowser::open(flow.authorization_url().as_str()).context("open user's browser")?;
    let params = eventually_callback
        .await
        .context("await authorization callback")?;

    let token = facade
        .handle_callback(&mut flow, params)
        .await
        .context("complete authorization")?;
    UserAuthorization::from_token(&token).context("use access token")
}
