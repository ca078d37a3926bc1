mod bingo_machine;
mod board_renderer;
mod config;
mod settai;
mod sound;
mod store;

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, value_parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bingo_machine::BingoMachine;
use config::Config;
use settai::SettaiMessage;
use sound::{CommandPlayer, SoundBank};
use store::SessionStore;

fn cli() -> Command {
    Command::new("settai-bingo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bingo number caller with an operator-controlled next number")
        .subcommand_required(true)
        .arg(Arg::new("config").long("config").value_name("FILE").global(true).value_parser(value_parser!(PathBuf)).help("Config file (defaults to $BINGO_CONFIG or bingo_config.json)"))
        .arg(Arg::new("store").long("store").value_name("FILE").global(true).value_parser(value_parser!(PathBuf)).help("Session file holding drawn numbers"))
        .subcommand(
            Command::new("draw")
                .about("Draw the next number")
                .arg(Arg::new("sound").long("sound").value_name("N").value_parser(value_parser!(usize)).help("Sound cue to play: 0 = random, 1.. = a specific cue")),
        )
        .subcommand(
            Command::new("settai")
                .about("Set, clear or show the number the next draw will return")
                .subcommand_required(true)
                .subcommand(Command::new("set").arg(Arg::new("number").required(true).allow_hyphen_values(true)))
                .subcommand(Command::new("clear"))
                .subcommand(Command::new("show")),
        )
        .subcommand(Command::new("status").about("Show drawn numbers"))
        .subcommand(Command::new("reset").about("Forget all drawn numbers and any settai number"))
        .subcommand(
            Command::new("board")
                .about("Render the called-number board to a PNG")
                .arg(Arg::new("out").long("out").value_name("FILE").default_value("bingo_board.png").value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("sound")
                .about("Play a sound cue")
                .arg(Arg::new("index").required(true).value_parser(value_parser!(usize))),
        )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    let config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let store_path = matches.get_one::<PathBuf>("store").cloned().unwrap_or_else(|| config.resolved_store_path());
    let mut store = SessionStore::open(&store_path)?;
    let machine = BingoMachine::new(config.max_number);

    match matches.subcommand() {
        Some(("draw", sub)) => draw(&config, &machine, &mut store, sub),
        Some(("settai", sub)) => settai_command(&machine, &mut store, sub),
        Some(("status", _)) => {
            print_status(&machine, &store);
            Ok(())
        }
        Some(("reset", _)) => {
            store.reset();
            store.save()?;
            println!("Session reset ({})", store.path().display());
            Ok(())
        }
        Some(("board", sub)) => {
            let out = sub.get_one::<PathBuf>("out").context("missing --out")?;
            board_renderer::render_called_board(machine.max_number(), store.drawn(), store.drawn().last().copied(), out)?;
            println!("Bingo board image written to {}", out.display());
            Ok(())
        }
        Some(("sound", sub)) => {
            let index = *sub.get_one::<usize>("index").context("missing sound index")?;
            sound_bank(&config).play(index, &mut rand::rng(), &player(&config));
            Ok(())
        }
        _ => unreachable!("subcommand_required is set"),
    }
}

fn draw(config: &Config, machine: &BingoMachine, store: &mut SessionStore, sub: &ArgMatches) -> Result<()> {
    if let Some(&index) = sub.get_one::<usize>("sound") {
        sound_bank(config).play(index, &mut rand::rng(), &player(config));
    }
    match store.draw_next(machine, &mut rand::rng())? {
        Some(n) => println!("{n}"),
        None => println!("All numbers have been drawn"),
    }
    Ok(())
}

fn settai_command(machine: &BingoMachine, store: &mut SessionStore, sub: &ArgMatches) -> Result<()> {
    let message = match sub.subcommand() {
        Some(("set", args)) => {
            let input = args.get_one::<String>("number").map(String::as_str).unwrap_or_default();
            match settai::validate(input, machine.max_number(), store.drawn()) {
                Ok(n) => {
                    store.set_settai(n);
                    store.save()?;
                    SettaiMessage::set(n)
                }
                Err(e) => {
                    tracing::warn!("settai rejected: {e}");
                    SettaiMessage::rejected(&e)
                }
            }
        }
        Some(("clear", _)) => {
            store.clear_settai();
            store.save()?;
            SettaiMessage::cleared()
        }
        _ => SettaiMessage::current(store.settai()),
    };
    println!("{message}");
    Ok(())
}

fn print_status(machine: &BingoMachine, store: &SessionStore) {
    let drawn = store.drawn();
    println!("Drawn {} of {}", drawn.len(), machine.numbers().len());
    if !drawn.is_empty() {
        let list: Vec<String> = drawn.iter().map(u32::to_string).collect();
        println!("{}", list.join(" "));
    }
    println!("Remaining: {}", machine.remaining(drawn).len());
}

fn sound_bank(config: &Config) -> SoundBank {
    SoundBank::preload(&config.sound_dir, &config.sounds)
}

fn player(config: &Config) -> CommandPlayer {
    match &config.player {
        Some(program) => CommandPlayer::new(program.clone()),
        None => CommandPlayer::platform_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_settai_set_accepts_negative_input() {
        // Negative values must reach validation rather than be parsed as flags.
        let m = cli().try_get_matches_from(["settai-bingo", "settai", "set", "-3"]).unwrap();
        let (_, settai) = m.subcommand().unwrap();
        let (_, set) = settai.subcommand().unwrap();
        assert_eq!(set.get_one::<String>("number").map(String::as_str), Some("-3"));
    }

    #[test]
    fn test_global_store_flag_after_subcommand() {
        let m = cli().try_get_matches_from(["settai-bingo", "status", "--store", "s.json"]).unwrap();
        assert_eq!(m.get_one::<PathBuf>("store"), Some(&PathBuf::from("s.json")));
    }
}
