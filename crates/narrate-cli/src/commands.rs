//! Subcommand handlers

use anyhow::Context;
use narrate_core::{
    parse_voice_list, run_batch, BatchPlan, LaunchStatus, NarrateConfig, PlayerCommand,
    ProcessPlayer, Utterance,
};
use tracing::info;

use crate::cli::{BatchArgs, SayArgs, TextArgs};
use crate::context::AppContext;

fn read_utterance(text: &TextArgs, voice: &str) -> anyhow::Result<Utterance> {
    let text = text.source()?.read()?;
    Ok(Utterance::new(text, voice))
}

pub async fn say(config: NarrateConfig, args: SayArgs) -> anyhow::Result<()> {
    let voice = args
        .voice
        .clone()
        .unwrap_or_else(|| config.output.voice.clone());
    let utterance = read_utterance(&args.text, &voice)?.with_delivery(args.delivery());
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.path.clone());

    let ctx = AppContext::new(&config)?;
    let report = ctx
        .narrator
        .render(args.mode.into(), &utterance, &path)
        .await
        .with_context(|| format!("Failed to narrate into {}", path.display()))?;

    println!("wrote {} ({} bytes)", report.path.display(), report.bytes);
    if let Some(launch) = &report.launch {
        print_launch(launch);
    }
    Ok(())
}

pub async fn batch(config: NarrateConfig, args: BatchArgs) -> anyhow::Result<()> {
    let voices = match &args.voices {
        Some(list) => parse_voice_list(list),
        None => config.output.batch_voices.clone(),
    };
    let utterance = read_utterance(&args.text, "")?.with_delivery(args.delivery());
    let plan = BatchPlan {
        voices,
        outdir: args
            .outdir
            .clone()
            .unwrap_or_else(|| config.output.outdir.clone()),
        basename: args
            .basename
            .clone()
            .unwrap_or_else(|| config.output.basename.clone()),
        mode: args.mode.into(),
    };

    println!("Voices: {:?}", plan.voices);
    println!(
        "Mode: {:?} | Style: {:?} | Speed: {:?}",
        args.mode, args.style, args.speed
    );

    let ctx = AppContext::new(&config)?;
    let report = run_batch(&ctx.narrator, &utterance, &plan).await?;

    for rendered in &report.rendered {
        println!("- {} -> {}", rendered.voice, rendered.path.display());
    }
    for skipped in &report.skipped {
        println!("  ! Skipped {} due to error: {}", skipped.voice, skipped.reason);
    }
    println!("Done.");
    Ok(())
}

pub fn voices(config: &NarrateConfig) {
    for voice in config.api.voice_catalog().voices() {
        println!("{}", voice);
    }
}

pub fn check(config: &NarrateConfig, dotenv_loaded: bool) {
    let key_set = std::env::var_os(&config.api.api_key_env)
        .map(|v| !v.is_empty())
        .unwrap_or(false);
    info!("Checked environment for {}", config.api.api_key_env);
    println!("dotenv_loaded: {}", dotenv_loaded);
    println!("{} set: {}", config.api.api_key_env, key_set);

    let player = ProcessPlayer::detect(&config.playback);
    println!("player: {}", describe(player.primary()));
    println!("opener: {}", describe(player.opener()));
}

fn describe(command: Option<&PlayerCommand>) -> String {
    match command {
        Some(c) if c.args.is_empty() => c.program.display().to_string(),
        Some(c) => format!("{} {}", c.program.display(), c.args.join(" ")),
        None => "not found".to_string(),
    }
}

pub fn show_config(config: &NarrateConfig) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}

fn print_launch(launch: &LaunchStatus) {
    match launch {
        LaunchStatus::Launched => println!("started playback"),
        LaunchStatus::Failed(reason) => println!("playback unavailable: {}", reason),
        LaunchStatus::NothingToPlay => println!("nothing to play"),
        LaunchStatus::AlreadyStarted => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_read_utterance_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narration.txt");
        std::fs::write(&path, "  Welcome to the show.\n").unwrap();

        let args = TextArgs {
            text: None,
            text_file: Some(path),
        };
        let utterance = read_utterance(&args, "alloy").unwrap();
        assert_eq!(utterance.input(), "Welcome to the show.");
        assert_eq!(utterance.voice(), "alloy");
    }

    #[test]
    fn test_missing_text_file_fails() {
        let args = TextArgs {
            text: None,
            text_file: Some(PathBuf::from("/nonexistent/narration.txt")),
        };
        assert!(read_utterance(&args, "alloy").is_err());
    }

    #[test]
    fn test_describe_player_command() {
        let ffplay = PlayerCommand::new("/usr/bin/ffplay", &["-nodisp", "-autoexit"]);
        assert_eq!(describe(Some(&ffplay)), "/usr/bin/ffplay -nodisp -autoexit");
        let opener = PlayerCommand::new("/usr/bin/xdg-open", &[]);
        assert_eq!(describe(Some(&opener)), "/usr/bin/xdg-open");
        assert_eq!(describe(None), "not found");
    }

    #[test]
    fn test_config_renders_as_toml() {
        let config = NarrateConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("model = \"gpt-4o-mini-tts\""));
        assert!(rendered.contains("[playback]"));
    }
}
