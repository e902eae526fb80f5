use std::fmt;

/// Where a collection currently is in its mutate-then-refetch cycle.
///
/// `Idle → Mutating → Refetching → Idle` on success,
/// `Idle → Mutating → ErrorReported → Idle` on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// Mirror reflects the last successful refresh.
    #[default]
    Idle,
    /// A write is in flight; the mirror still shows pre-mutation data.
    Mutating,
    /// The write succeeded and the canonical rows are being fetched.
    Refetching,
    /// The write or refetch failed; the mirror was left untouched.
    ErrorReported,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Mutating => "mutating",
            SyncPhase::Refetching => "refetching",
            SyncPhase::ErrorReported => "error-reported",
        };
        f.write_str(name)
    }
}

/// Monotonic per-collection sequence number.
///
/// Handed out when a mutation or load starts; the data it eventually fetches
/// is only applied if no newer ticket has been applied in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sync bookkeeping for one collection.
#[derive(Debug, Clone, Default)]
pub struct SyncTracker {
    phase: SyncPhase,
    issued: u64,
    applied: u64,
}

impl SyncTracker {
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Ticket of the data currently held; `0` before the first refresh.
    pub fn version(&self) -> u64 {
        self.applied
    }

    fn issue(&mut self, phase: SyncPhase) -> Ticket {
        self.issued += 1;
        self.phase = phase;
        Ticket(self.issued)
    }

    pub fn begin_mutation(&mut self) -> Ticket {
        self.issue(SyncPhase::Mutating)
    }

    /// Starts a plain refresh (startup load) with no preceding write.
    pub fn begin_load(&mut self) -> Ticket {
        self.issue(SyncPhase::Refetching)
    }

    pub fn mark_refetching(&mut self, ticket: Ticket) {
        if ticket.0 == self.issued {
            self.phase = SyncPhase::Refetching;
        }
    }

    /// Accepts the result for `ticket` unless newer data is already applied.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        if ticket.0 < self.applied {
            return false;
        }
        self.applied = ticket.0;
        if ticket.0 == self.issued {
            self.phase = SyncPhase::Idle;
        }
        true
    }

    /// Records a failed cycle. The mirror is never touched here.
    pub fn fail(&mut self, ticket: Ticket) -> SyncPhase {
        if ticket.0 == self.issued {
            self.phase = SyncPhase::ErrorReported;
        }
        let reported = self.phase;
        if reported == SyncPhase::ErrorReported {
            self.phase = SyncPhase::Idle;
        }
        reported
    }
}
