//! Commande `host` : consultation et pilotage des hosts de l'annuaire.

use super::{Command, CommandOutcome, ShellContext};
use anyhow::{Context, Result, bail};
use peekcontrol::detail::{render_host_detail, render_host_summary};
use peekcontrol::discovery::CancelToken;
use peekcontrol::enricher::{DescriptionEnricher, EnrichOutcome, HttpFetcher};
use peekcontrol::invoker::{ActionInvoker, HttpSoapClient, InvokeOutcome, ValueProvider};
use peekcontrol::model::StateVariable;
use std::io::{BufRead, Write};

pub struct HostCommand;

impl Command for HostCommand {
    fn name(&self) -> &'static str {
        "host"
    }

    fn quick_view(&self) -> &'static str {
        "view and operate on discovered hosts"
    }

    fn long_help(&self) -> &'static str {
        "host list\n\
         \tone line per known host: index and address\n\
         host get <index>\n\
         \tfetch the host's description document and every service SCPD\n\
         host summary <index>\n\
         \tshort device/service overview of an enumerated host\n\
         host details <index>\n\
         \tfull detail: devices, services, actions, state variables\n\
         host info <index> [key ...]\n\
         \twalk the host structure one key at a time\n\
         host send <index> <device> <service> <action>\n\
         \tinvoke a SOAP action; 'in' arguments are prompted for"
    }

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome> {
        match args {
            [sub] if sub == "list" => host_list(ctx),
            [sub, index] if sub == "get" => host_get(ctx, parse_index(index)?),
            [sub, index] if sub == "summary" => host_summary(ctx, parse_index(index)?),
            [sub, index] if sub == "details" => host_details(ctx, parse_index(index)?),
            [sub, index, path @ ..] if sub == "info" => {
                host_info(ctx, parse_index(index)?, path)
            }
            [sub, index, device, service, action] if sub == "send" => {
                host_send(ctx, parse_index(index)?, device, service, action)
            }
            _ => bail!("usage: host list|get|summary|details|info|send (see 'help host')"),
        }?;
        Ok(CommandOutcome::Continue)
    }
}

fn parse_index(raw: &str) -> Result<usize> {
    raw.parse::<usize>()
        .with_context(|| format!("'{raw}' is not a host index"))
}

fn host_list(ctx: &ShellContext) -> Result<()> {
    if ctx.directory.is_empty() {
        println!("no hosts discovered yet; run 'msearch' or 'pcap' first");
        return Ok(());
    }
    for (index, name) in ctx.directory.list() {
        println!("\t[{index}] {name}");
    }
    Ok(())
}

fn host_get(ctx: &mut ShellContext, index: usize) -> Result<()> {
    let enricher = DescriptionEnricher::new(HttpFetcher::default());
    let entry = ctx.directory.get_mut(index)?;
    match enricher.enrich(entry)? {
        EnrichOutcome::Enriched => {
            println!(
                "Host {} enumerated: {} device(s)",
                entry.name,
                entry.device_list.len()
            );
        }
        EnrichOutcome::AlreadyComplete => {
            println!("Host {} is already enumerated", entry.name);
        }
    }
    Ok(())
}

fn host_summary(ctx: &ShellContext, index: usize) -> Result<()> {
    print!("{}", render_host_summary(ctx.directory.get(index)?));
    Ok(())
}

fn host_details(ctx: &ShellContext, index: usize) -> Result<()> {
    print!("{}", render_host_detail(ctx.directory.get(index)?));
    Ok(())
}

fn host_info(ctx: &ShellContext, index: usize, path: &[String]) -> Result<()> {
    let node = ctx.directory.navigate(index, path)?;
    for (key, value) in node.entries() {
        match value {
            Some(leaf) => println!("\t{key}: {leaf}"),
            None => println!("\t{key}: {{}}"),
        }
    }
    Ok(())
}

fn host_send(
    ctx: &mut ShellContext,
    index: usize,
    device: &str,
    service: &str,
    action: &str,
) -> Result<()> {
    let entry = ctx.directory.get(index)?.clone();
    let invoker = ActionInvoker::new(HttpSoapClient::new());
    let mut provider = StdinProvider {
        cancel: ctx.cancel.clone(),
    };

    match invoker.invoke(&entry, device, service, action, &mut provider)? {
        InvokeOutcome::Completed(outputs) => {
            if outputs.is_empty() {
                println!("{action} completed (no output arguments)");
            }
            for (name, value) in outputs {
                match value {
                    Some(v) => println!("\t{name}: {v}"),
                    None => println!("\t{name}: (not present in response)"),
                }
            }
        }
        InvokeOutcome::Cancelled => println!("{action} cancelled, nothing sent"),
    }
    Ok(())
}

/// Saisie interactive des arguments `in`, avec le contrat de la state
/// variable affiché avant chaque prompt.
struct StdinProvider {
    cancel: CancelToken,
}

impl ValueProvider for StdinProvider {
    fn prompt(&mut self, arg_name: &str, state_var: &StateVariable) -> Option<String> {
        if self.cancel.is_cancelled() {
            return None;
        }

        if let Some(values) = &state_var.allowed_values {
            println!("\tallowed values: {}", values.join(", "));
        }
        if let Some((min, max)) = &state_var.allowed_range {
            println!("\tallowed range: {min} .. {max}");
        }
        if let Some(default) = &state_var.default_value {
            println!("\tdefault: {default}");
        }

        print!("Set {} ({}) to: ", arg_name, state_var.data_type);
        std::io::stdout().flush().ok()?;

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) => None, // EOF : saisie abandonnée
            Ok(_) => {
                if self.cancel.is_cancelled() {
                    None
                } else {
                    Some(line.trim_end_matches(['\r', '\n']).to_string())
                }
            }
            Err(_) => None,
        }
    }
}
