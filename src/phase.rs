use std::fmt;

/// The six phases of a turn, in order. `End` wraps back to `Draw`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Phase {
    Draw,
    Standby,
    Main1,
    Battle,
    Main2,
    End,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Draw,
        Phase::Standby,
        Phase::Main1,
        Phase::Battle,
        Phase::Main2,
        Phase::End,
    ];

    pub fn next(self) -> Phase {
        match self {
            Phase::Draw => Phase::Standby,
            Phase::Standby => Phase::Main1,
            Phase::Main1 => Phase::Battle,
            Phase::Battle => Phase::Main2,
            Phase::Main2 => Phase::End,
            Phase::End => Phase::Draw,
        }
    }

    pub fn is_main(self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Draw => "Draw Phase",
            Phase::Standby => "Standby Phase",
            Phase::Main1 => "Main Phase 1",
            Phase::Battle => "Battle Phase",
            Phase::Main2 => "Main Phase 2",
            Phase::End => "End Phase",
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Draw
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
