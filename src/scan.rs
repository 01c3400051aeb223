//! Find every instrument a resource manager can see and ask each one who it is.

use core::fmt;

use fugit::MillisDurationU32;

use crate::{command::Command, session::Session, transport::ResourceManager};

/// What happened when probing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The trimmed `*IDN?` reply.
    Identified(String),
    /// The resource opened but did not answer `*IDN?`.
    QueryFailed(String),
    /// The resource could not be opened.
    OpenFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceProbe {
    pub resource: String,
    pub outcome: ProbeOutcome,
}

/// The result of a scan. Its [`Display`](fmt::Display) output is the human-readable listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    /// The manager could not list its resources.
    ListFailed(String),
    /// One probe per listed resource, in listing order. Empty if nothing was found.
    Probed(Vec<ResourceProbe>),
}

impl ScanReport {
    /// Probes of the resources that answered `*IDN?`.
    pub fn identified(&self) -> impl Iterator<Item = (&str, &str)> {
        let probes = match self {
            ScanReport::Probed(probes) => probes.as_slice(),
            ScanReport::ListFailed(_) => &[],
        };
        probes.iter().filter_map(|probe| match &probe.outcome {
            ProbeOutcome::Identified(idn) => Some((probe.resource.as_str(), idn.as_str())),
            _ => None,
        })
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Identified(idn) => write!(f, "*IDN?: {idn}"),
            ProbeOutcome::QueryFailed(e) => write!(f, "Could not query *IDN?: {e}"),
            ProbeOutcome::OpenFailed(e) => write!(f, "Could not open: {e}"),
        }
    }
}

/// Progress of a running scan, reported as it happens.
///
/// Printing every event in order gives the same text as printing the final [`ScanReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEvent<'a> {
    /// The manager could not list its resources. Nothing else follows.
    ListFailed(&'a str),
    /// The manager listed this many resources.
    Listed(usize),
    /// About to open this resource.
    Probing(&'a str),
    /// The resource announced by the preceding [`ScanEvent::Probing`] is done.
    Probed(&'a ProbeOutcome),
}

impl fmt::Display for ScanEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanEvent::ListFailed(e) => writeln!(f, "Could not list VISA resources: {e}"),
            ScanEvent::Listed(0) => writeln!(f, "No VISA devices found."),
            ScanEvent::Listed(_) => writeln!(f, "Connected VISA devices:\n"),
            ScanEvent::Probing(resource) => writeln!(f, "Resource: {resource}"),
            ScanEvent::Probed(outcome) => writeln!(f, "  {outcome}\n"),
        }
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanReport::ListFailed(e) => write!(f, "{}", ScanEvent::ListFailed(e)),
            ScanReport::Probed(probes) => {
                write!(f, "{}", ScanEvent::Listed(probes.len()))?;
                for probe in probes {
                    write!(f, "{}", ScanEvent::Probing(&probe.resource))?;
                    write!(f, "{}", ScanEvent::Probed(&probe.outcome))?;
                }
                Ok(())
            }
        }
    }
}

/// Open `resource`, query `*IDN?` and close it again.
pub fn probe<M: ResourceManager>(
    manager: &mut M,
    resource: &str,
    timeout: MillisDurationU32,
) -> ProbeOutcome {
    let mut session: Session<M::Transport> = match Session::open(manager, resource, timeout) {
        Ok(session) => session,
        Err(e) => {
            log::debug!("{resource}: open failed: {e}");
            return ProbeOutcome::OpenFailed(e.to_string());
        }
    };

    let outcome = match session.query(Command::Identify) {
        Ok(idn) => ProbeOutcome::Identified(idn.trim().to_owned()),
        Err(e) => ProbeOutcome::QueryFailed(e.to_string()),
    };

    if let Err(e) = session.close() {
        log::warn!("{resource}: close failed: {e}");
    }
    outcome
}

/// Probe every resource `manager` lists. One resource failing never stops the others.
pub fn scan<M: ResourceManager>(manager: &mut M, timeout: MillisDurationU32) -> ScanReport {
    scan_with(manager, timeout, |_| {})
}

/// Like [`scan`], calling `on_event` as each step happens so results can be shown while slow
/// resources are still being probed.
pub fn scan_with<M, F>(manager: &mut M, timeout: MillisDurationU32, mut on_event: F) -> ScanReport
where
    M: ResourceManager,
    F: FnMut(ScanEvent<'_>),
{
    let resources = match manager.list_resources() {
        Ok(resources) => resources,
        Err(e) => {
            log::warn!("Listing resources failed: {e}");
            let error = e.to_string();
            on_event(ScanEvent::ListFailed(&error));
            return ScanReport::ListFailed(error);
        }
    };
    log::info!("Found {} resource(s)", resources.len());
    on_event(ScanEvent::Listed(resources.len()));

    let probes = resources
        .into_iter()
        .map(|resource| {
            on_event(ScanEvent::Probing(&resource));
            let outcome = probe(&mut *manager, &resource, timeout);
            on_event(ScanEvent::Probed(&outcome));
            ResourceProbe { resource, outcome }
        })
        .collect();
    ScanReport::Probed(probes)
}
