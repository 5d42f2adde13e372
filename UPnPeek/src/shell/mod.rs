//! Boucle de commandes interactive.
//!
//! Chaque commande est un objet [`Command`] enregistré dans le
//! [`CommandRegistry`] ; le dispatch se fait par nom exact, jamais par
//! évaluation dynamique. L'état de session ([`ShellContext`]) est passé
//! par `&mut` au handler.

mod config;
mod discovery;
mod files;
mod host;

use crate::settings::Settings;
use anyhow::Result;
use indexmap::IndexMap;
use peekcontrol::directory::HostDirectory;
use peekcontrol::discovery::CancelToken;
use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// État de session du shell, construit une fois dans `main`.
pub struct ShellContext {
    pub settings: Settings,
    pub directory: HostDirectory,
    /// En-têtes supplémentaires des M-SEARCH (MAN, MX, ...).
    pub headers: IndexMap<String, String>,
    /// Journal des commandes saisies, si `log` est actif.
    pub log: Option<File>,
    pub cancel: CancelToken,
    /// Levé pendant l'exécution d'une commande : Ctrl-C annule au lieu de
    /// quitter.
    pub busy: Arc<AtomicBool>,
    /// Rebascule le filtre de logs (branché sur le handle de reload du
    /// subscriber dans `main`).
    pub set_verbosity: Box<dyn Fn(bool)>,
}

impl ShellContext {
    pub fn new(settings: Settings) -> Self {
        let mut headers = IndexMap::new();
        headers.insert("MAN".to_string(), "\"ssdp:discover\"".to_string());
        headers.insert("MX".to_string(), "10".to_string());
        Self {
            settings,
            directory: HostDirectory::new(),
            headers,
            log: None,
            cancel: CancelToken::new(),
            busy: Arc::new(AtomicBool::new(false)),
            set_verbosity: Box::new(|_| {}),
        }
    }

    /// Consigne une ligne dans le journal de commandes, si actif.
    pub fn log_line(&mut self, line: &str) {
        if let Some(file) = &mut self.log {
            if let Err(e) = writeln!(file, "{line}") {
                eprintln!("command log write failed: {e}");
                self.log = None;
            }
        }
    }
}

/// Une commande du shell.
pub trait Command {
    fn name(&self) -> &'static str;

    /// Résumé une ligne pour l'index de `help`.
    fn quick_view(&self) -> &'static str;

    /// Aide détaillée pour `help <commande>`.
    fn long_help(&self) -> &'static str;

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome>;
}

/// Suite donnée à la boucle après une commande.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Exit,
}

pub struct CommandRegistry {
    commands: IndexMap<&'static str, Box<dyn Command>>,
    aliases: IndexMap<&'static str, &'static str>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            commands: IndexMap::new(),
            aliases: IndexMap::new(),
        };
        registry.register(Box::new(discovery::MsearchCommand));
        registry.register(Box::new(discovery::PcapCommand));
        registry.register(Box::new(host::HostCommand));
        registry.register(Box::new(files::SaveCommand));
        registry.register(Box::new(files::LoadCommand));
        registry.register(Box::new(config::SetCommand));
        registry.register(Box::new(config::HeadCommand));
        registry.register(Box::new(files::LogCommand));
        registry.register(Box::new(HelpCommand));
        registry.register(Box::new(ExitCommand));
        registry.alias("quit", "exit");
        registry
    }

    fn register(&mut self, command: Box<dyn Command>) {
        self.commands.insert(command.name(), command);
    }

    fn alias(&mut self, alias: &'static str, target: &'static str) {
        self.aliases.insert(alias, target);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        let name = self.aliases.get(name).copied().unwrap_or(name);
        self.commands.get(name).map(|b| b.as_ref())
    }

    /// Une ligne par commande, pour `help`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for command in self.commands.values() {
            out.push_str(&format!("\t{:<8} {}\n", command.name(), command.quick_view()));
        }
        out.push_str("\tquit     alias of exit\n");
        out
    }

    /// Exécute une ligne de commande complète.
    pub fn dispatch(&self, ctx: &mut ShellContext, line: &str) -> CommandOutcome {
        let tokens: Vec<String> = line.split_whitespace().map(|s| s.to_string()).collect();
        let Some((name, args)) = tokens.split_first() else {
            return CommandOutcome::Continue;
        };

        // `help` a besoin du registre lui-même, il est résolu ici.
        if name == "help" {
            ctx.log_line(line);
            match args.first() {
                Some(topic) => match self.get(topic) {
                    Some(command) => println!("{}", command.long_help()),
                    None => println!("unknown command '{topic}'"),
                },
                None => print!("{}", self.summary()),
            }
            return CommandOutcome::Continue;
        }

        let Some(command) = self.get(name) else {
            println!("unknown command '{name}'");
            print!("{}", self.summary());
            return CommandOutcome::Continue;
        };

        ctx.log_line(line);
        ctx.cancel.reset();
        ctx.busy.store(true, std::sync::atomic::Ordering::SeqCst);
        let result = command.run(ctx, args);
        ctx.busy.store(false, std::sync::atomic::Ordering::SeqCst);

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                println!("{e}");
                CommandOutcome::Continue
            }
        }
    }
}

struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn quick_view(&self) -> &'static str {
        "show this summary, or 'help <command>' for details"
    }

    fn long_help(&self) -> &'static str {
        "help [command]\n\twithout argument: one-line summary of every command\n\twith a command name: its detailed usage"
    }

    fn run(&self, _ctx: &mut ShellContext, _args: &[String]) -> Result<CommandOutcome> {
        // Résolu dans `dispatch`, qui seul voit le registre.
        Ok(CommandOutcome::Continue)
    }
}

struct ExitCommand;

impl Command for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn quick_view(&self) -> &'static str {
        "leave the shell"
    }

    fn long_help(&self) -> &'static str {
        "exit\n\tleave the shell (alias: quit)"
    }

    fn run(&self, _ctx: &mut ShellContext, _args: &[String]) -> Result<CommandOutcome> {
        Ok(CommandOutcome::Exit)
    }
}
