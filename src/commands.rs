use anyhow::{Context as _, Result};
use log::info;
use poise::serenity_prelude as serenity;
use poise::CreateReply;
use serenity::builder::CreateEmbed;

use crate::config::GameConfig;
use crate::roulette::{self, Color, RoundResult, Tone};
use crate::session::{Placement, SessionController};

type Context<'a> = poise::Context<'a, Data, anyhow::Error>;

/// One table shared by every command invocation.
pub struct Data {
    pub session: SessionController,
}

impl Data {
    fn new(config: &GameConfig) -> Self {
        Self {
            session: SessionController::from_config(config),
        }
    }
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum ColorChoice {
    Red,
    Black,
    Green,
}

impl From<ColorChoice> for Color {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Red => Color::Red,
            ColorChoice::Black => Color::Black,
            ColorChoice::Green => Color::Green,
        }
    }
}

fn tone_colour(tone: Tone) -> serenity::Colour {
    match tone {
        Tone::Pocket(Color::Red) => serenity::Colour::from_rgb(0xef, 0x44, 0x44),
        Tone::Pocket(Color::Black) => serenity::Colour::from_rgb(0x11, 0x18, 0x27),
        Tone::Pocket(Color::Green) => serenity::Colour::from_rgb(0x22, 0xc5, 0x5e),
        Tone::Warning => serenity::Colour::from_rgb(0xea, 0xb3, 0x08),
    }
}

fn result_embed(result: &RoundResult, balance: i64) -> CreateEmbed {
    CreateEmbed::new()
        .title(result.to_string())
        .description(format!("Balance: ${balance}"))
        .colour(tone_colour(result.tone()))
}

/// Bet on where the ball lands
#[poise::command(slash_command, prefix_command)]
async fn bet(
    ctx: Context<'_>,
    #[description = "How much to wager"] amount: i64,
    #[description = "Red and Black pay 2x, Green pays 14x"] color: Option<ColorChoice>,
) -> Result<()> {
    let session = &ctx.data().session;

    match session.place_bet(amount, color.map(Color::from)) {
        Placement::Ignored => {
            ctx.say("A spin is already in progress").await?;
        }
        Placement::Rejected(reason) => {
            let embed = result_embed(&RoundResult::Rejected(reason), session.balance());
            ctx.send(CreateReply::default().embed(embed)).await?;
        }
        Placement::Spinning(pending) => {
            let handle = ctx
                .send(CreateReply::default().content(format!(
                    "Spinning... ${} on {}",
                    pending.request.amount, pending.request.chosen_color
                )))
                .await?;

            let settled = pending
                .settled()
                .await
                .context("session closed mid-spin")?;
            let result = RoundResult::Settled(settled.resolution);
            let reply = CreateReply::default()
                .content("")
                .embed(result_embed(&result, settled.balance));
            handle.edit(ctx, reply).await?;
        }
    }
    Ok(())
}

/// Shows the table balance
#[poise::command(slash_command, prefix_command)]
async fn balance(ctx: Context<'_>) -> Result<()> {
    let state = ctx.data().session.snapshot();
    let status = if state.is_spinning { " (spinning...)" } else { "" };
    ctx.say(format!("Balance: ${}{}", state.balance, status))
        .await?;
    Ok(())
}

/// Lists the payout multipliers
#[poise::command(slash_command, prefix_command)]
async fn multipliers(ctx: Context<'_>) -> Result<()> {
    let legend = roulette::multiplier_legend(ctx.data().session.multipliers())
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    ctx.say(format!("Multipliers:\n{legend}")).await?;
    Ok(())
}

async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, anyhow::Error>,
    data: &Data,
) -> Result<()> {
    if let serenity::FullEvent::Ready { data_about_bot, .. } = event {
        info!(
            "Logged in as {}, table balance {}",
            data_about_bot.user.name,
            data.session.balance()
        );
    }
    Ok(())
}

pub async fn start(config: GameConfig) -> Result<()> {
    let token = std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN")?;
    let intents = serenity::GatewayIntents::non_privileged();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![bet(), balance(), multipliers()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            let config = config.clone();
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(Data::new(&config))
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;
    client.start().await?;
    Ok(())
}
