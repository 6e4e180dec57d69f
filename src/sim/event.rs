/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and messages.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Jumped,
    CoinCollected { x: usize, y: usize },
    EnemyHit { lives_left: u32 },
    /// Fell past the bottom row; stage re-entered without losing a life.
    PlayerRespawned,
    StageCleared { stage: usize },
    GameOver,
    AllStagesCleared,
}

/// Named sound effects understood by the presentation sink.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SoundCue {
    Jump,
    Coin,
    EnemyHit,
    StageClear,
    GameOver,
}

impl GameEvent {
    pub fn cue(&self) -> Option<SoundCue> {
        match self {
            GameEvent::Jumped => Some(SoundCue::Jump),
            GameEvent::CoinCollected { .. } => Some(SoundCue::Coin),
            GameEvent::EnemyHit { .. } => Some(SoundCue::EnemyHit),
            GameEvent::StageCleared { .. } => Some(SoundCue::StageClear),
            GameEvent::GameOver => Some(SoundCue::GameOver),
            GameEvent::PlayerRespawned | GameEvent::AllStagesCleared => None,
        }
    }
}
