//! Coinpath entry point
//!
//! On the web the wasm `start` function in `coinpath::web` boots the stores.
//! Natively this is a small driver over a JSON storage file, handy for
//! inspecting and poking at saved state.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::rc::Rc;

    use clap::{Parser, Subcommand, ValueEnum};
    use coinpath::App;
    use coinpath::game::{ChoiceKind, ChoiceRoller, ChoiceRules};
    use coinpath::platform::{FileStorage, KeyValueStore, MemoryStorage, time};

    #[derive(Parser, Debug)]
    #[command(name = "coinpath")]
    #[command(version, about = "Inspect and edit saved coinpath state", long_about = None)]
    pub struct Cli {
        /// Path to the JSON storage file
        #[arg(short, long, default_value = "coinpath-storage.json")]
        pub storage: PathBuf,

        #[command(subcommand)]
        pub command: Option<Command>,
    }

    #[derive(Subcommand, Debug, PartialEq)]
    pub enum Command {
        /// Print all state as JSON
        Status,
        /// Mark a module completed
        Complete { module: u32 },
        /// Set the current module
        Goto { module: u32 },
        /// Mark the intro story viewed
        Story,
        /// Play one week-1 round
        Play {
            #[arg(value_enum)]
            kind: KindArg,
        },
        /// Complete week 1 and bank the result
        FinishWeek,
        /// Restart week 1
        ResetWeek,
        /// Erase all saved state
        Reset,
    }

    #[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
    pub enum KindArg {
        Save,
        Invest,
    }

    impl From<KindArg> for ChoiceKind {
        fn from(kind: KindArg) -> Self {
            match kind {
                KindArg::Save => ChoiceKind::Save,
                KindArg::Invest => ChoiceKind::Invest,
            }
        }
    }

    pub fn run(cli: Cli) -> Result<(), String> {
        let command = cli.command.unwrap_or(Command::Status);
        match FileStorage::open(&cli.storage) {
            Ok(storage) => execute(App::boot(Rc::new(storage)), command),
            Err(e) => {
                log::warn!(
                    "Cannot open {} ({}), state will not be saved",
                    cli.storage.display(),
                    e
                );
                execute(App::boot(Rc::new(MemoryStorage::new())), command)
            }
        }
    }

    fn execute<S: KeyValueStore>(mut app: App<S>, command: Command) -> Result<(), String> {
        match command {
            Command::Status => {}
            Command::Complete { module } => app.progress().complete_module(module),
            Command::Goto { module } => app.progress().set_current_module(module),
            Command::Story => app.progress().complete_story(),
            Command::Play { kind } => {
                let kind = ChoiceKind::from(kind);
                let mut roller = ChoiceRoller::new(ChoiceRules::default(), time::now_ms() as u64);
                match app.investment().play(kind, &mut roller) {
                    Some(delta) => println!("{} -> {:+.2}", kind.as_str(), delta),
                    None => println!("week 1 is complete; run reset-week to play again"),
                }
            }
            Command::FinishWeek => match app.investment().complete_week1() {
                Some(net) => println!("week 1 banked: {:+.2}", net),
                None => println!("week 1 already completed"),
            },
            Command::ResetWeek => app.investment().reset_week1(),
            Command::Reset => app.reset_everything(),
        }

        let snapshot = serde_json::to_string_pretty(&app.snapshot()).map_err(|e| e.to_string())?;
        println!("{snapshot}");
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    log::info!("Coinpath (native) starting...");

    if let Err(message) = native::run(native::Cli::parse()) {
        eprintln!("{message}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is coinpath::web::wasm_main
}
