use serde::Serialize;

pub const BOSS_WAVE_INTERVAL: u32 = 5;
const FIRST_WAVE_KILLS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveInfo {
    pub wave: u32,
    pub killed: u32,
    pub required: u32,
    pub is_boss_wave: bool,
    pub progress: u32,
}

#[derive(Clone, Debug)]
pub struct WaveSystem {
    current_wave: u32,
    killed_this_wave: u32,
    required: u32,
    complete: bool,
}

impl Default for WaveSystem {
    fn default() -> Self {
        Self {
            current_wave: 1,
            killed_this_wave: 0,
            required: FIRST_WAVE_KILLS,
            complete: false,
        }
    }
}

pub fn kills_required(wave: u32) -> u32 {
    5 + wave * 2
}

impl WaveSystem {
    pub fn wave(&self) -> u32 {
        self.current_wave
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_boss_wave(&self) -> bool {
        self.current_wave % BOSS_WAVE_INTERVAL == 0
    }

    pub fn register_kill(&mut self) {
        self.killed_this_wave += 1;
        if self.killed_this_wave >= self.required {
            self.complete = true;
        }
    }

    pub fn next_wave(&mut self) {
        self.current_wave += 1;
        self.killed_this_wave = 0;
        self.required = kills_required(self.current_wave);
        self.complete = false;
    }

    pub fn difficulty_multiplier(&self) -> f64 {
        self.current_wave as f64 / 2.0 + 1.0
    }

    pub fn info(&self) -> WaveInfo {
        WaveInfo {
            wave: self.current_wave,
            killed: self.killed_this_wave,
            required: self.required,
            is_boss_wave: self.is_boss_wave(),
            progress: self.killed_this_wave * 100 / self.required.max(1),
        }
    }
}
