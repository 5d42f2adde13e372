//! Commandes de découverte : `msearch` (actif) et `pcap` (passif).

use super::{Command, CommandOutcome, ShellContext};
use anyhow::{Result, bail};
use peekcontrol::discovery::{
    DiscoveryMode, DiscoveryOptions, DiscoveryReport, DiscoverySession, StopReason,
};
use peekupnp::ssdp::{SearchTarget, SsdpListener};

pub struct MsearchCommand;

impl Command for MsearchCommand {
    fn name(&self) -> &'static str {
        "msearch"
    }

    fn quick_view(&self) -> &'static str {
        "actively search for UPnP hosts (M-SEARCH)"
    }

    fn long_help(&self) -> &'static str {
        "msearch [device|service <name>]\n\
         \twithout argument: search for all root devices\n\
         \twith 'device <name>' or 'service <name>': search for that\n\
         \tdevice or service type, at the configured UPnP version\n\
         \tbounded by the 'timeout' and 'max' settings; Ctrl-C stops early\n\
         \tand keeps partial results"
    }

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome> {
        let search_target = match args {
            [] => SearchTarget::RootDevice,
            [kind, name] if kind == "device" || kind == "service" => {
                SearchTarget::urn(kind, name, &ctx.settings.upnp_version)
            }
            _ => bail!("usage: msearch [device|service <name>]"),
        };

        let options = DiscoveryOptions {
            mode: DiscoveryMode::Active,
            max_hosts: ctx.settings.max_hosts,
            timeout: ctx.settings.timeout,
            unique_only: ctx.settings.unique_only,
            search_target,
            extra_headers: ctx.headers.clone(),
        };

        // Les réponses aux M-SEARCH arrivent en unicast : socket éphémère
        // dédié, jamais le listener multicast.
        let mut listener = SsdpListener::open_unicast()?;
        println!("Entering discovery mode, Ctrl-C to stop...");
        let report =
            DiscoverySession::new(options).run(&mut ctx.directory, &mut listener, &ctx.cancel);
        print_report(ctx, &report);
        Ok(CommandOutcome::Continue)
    }
}

pub struct PcapCommand;

impl Command for PcapCommand {
    fn name(&self) -> &'static str {
        "pcap"
    }

    fn quick_view(&self) -> &'static str {
        "passively listen for UPnP NOTIFY announcements"
    }

    fn long_help(&self) -> &'static str {
        "pcap\n\
         \tlisten on the SSDP multicast group for unsolicited NOTIFY\n\
         \tannouncements; requires binding udp/1900 (may need privileges)\n\
         \tbounded by the 'timeout' and 'max' settings; Ctrl-C stops early"
    }

    fn run(&self, ctx: &mut ShellContext, args: &[String]) -> Result<CommandOutcome> {
        if !args.is_empty() {
            bail!("usage: pcap");
        }

        let options = DiscoveryOptions {
            mode: DiscoveryMode::Passive,
            max_hosts: ctx.settings.max_hosts,
            timeout: ctx.settings.timeout,
            unique_only: ctx.settings.unique_only,
            search_target: SearchTarget::RootDevice,
            extra_headers: ctx.headers.clone(),
        };

        let mut listener = SsdpListener::open_multicast(ctx.settings.iface.as_deref())?;
        println!("Entering passive listen mode, Ctrl-C to stop...");
        let report =
            DiscoverySession::new(options).run(&mut ctx.directory, &mut listener, &ctx.cancel);
        print_report(ctx, &report);
        Ok(CommandOutcome::Continue)
    }
}

fn print_report(ctx: &ShellContext, report: &DiscoveryReport) {
    for index in &report.inserted {
        if let Ok(host) = ctx.directory.get(*index) {
            println!("\t[{}] {} ({})", host.index, host.name, host.identity);
        }
    }
    let ending = match report.stop {
        StopReason::Cancelled => "interrupted",
        StopReason::MaxHostsReached => "host limit reached",
        StopReason::TimedOut => "timeout reached",
        StopReason::TransportClosed => "listener closed",
    };
    println!(
        "Discovery ended ({}): {} new host(s), {} duplicate(s) skipped",
        ending,
        report.inserted.len(),
        report.duplicates
    );
}
