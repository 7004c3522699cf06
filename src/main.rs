use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use clap::Parser;
use coup_engine::host::{Message, Recipient};
use coup_engine::transcript::{Event, Transcript};
use coup_engine::{Coup, CoupError, GameConfig, RecordingHost};

#[derive(Debug, Parser)]
#[command(name = "coup-tty")]
#[command(about = "Play Coup at a terminal, one line per button press")]
struct Args {
    /// Player names, 2 to 6 of them
    #[arg(required = true, num_args = 2..=6)]
    names: Vec<String>,

    /// JSON game config (variant, start_player, seed, card_overrides, wait_time_ms)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write every press and wait to this CSV file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Replay a CSV transcript before reading from stdin
    #[arg(long)]
    replay: Option<PathBuf>,
}

fn print_messages(out: &mut impl Write, game: &Coup<RecordingHost>, messages: &[Message]) -> io::Result<()> {
    for message in messages {
        match message.to {
            Recipient::Everyone => writeln!(out, "[everyone]")?,
            Recipient::Player(player) => writeln!(out, "[{player} {}]", game.player(player).name)?,
        }

        writeln!(out, "{}", message.text)?;

        for button in &message.buttons {
            writeln!(out, "  ({}) {}", button.data, button.label)?;
        }

        writeln!(out)?;
    }

    Ok(())
}

fn main() -> Result<(), CoupError> {
    env_logger::init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GameConfig::from_reader(File::open(path)?)?,
        None => GameConfig::default(),
    };
    let wait_time = config.wait_time();

    let mut game = Coup::new(RecordingHost::new(), args.names, config)?;
    let mut transcript = Transcript::new();

    if let Some(path) = &args.replay {
        let replay = Transcript::load(path)?;
        replay.replay(&mut game);
        for event in replay.events() {
            transcript.push(event.clone());
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let messages = game.host_mut().take_messages();
    print_messages(&mut out, &game, &messages)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();

        match line {
            "" => continue,
            "quit" => break,
            "wait" => {
                game.advance(wait_time);
                transcript.push(Event::wait(wait_time));
            }
            _ => {
                let Some((player, data)) = line.split_once(char::is_whitespace) else {
                    writeln!(out, "expected \"<player> <button data>\", \"wait\" or \"quit\"")?;
                    continue;
                };

                let Ok(player) = player.parse::<usize>() else {
                    writeln!(out, "{player:?} is not a player number")?;
                    continue;
                };

                let data = data.trim();
                game.handle_action(player, data);
                transcript.push(Event::press(player, data));
            }
        }

        let messages = game.host_mut().take_messages();
        print_messages(&mut out, &game, &messages)?;

        if game.is_over() {
            // deliver the game over notification
            game.advance(std::time::Duration::ZERO);
            break;
        }
    }

    if let Some(path) = &args.record {
        transcript.save(path)?;
        log::info!("saved {} events to {}", transcript.len(), path.display());
    }

    Ok(())
}
