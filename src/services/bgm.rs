//! Background music through an external player process.
//!
//! [`BgmManager::new`] does no I/O. The player lookup and directory scan happen in
//! [`BgmManager::ensure_ready`], which the controller calls once the splash screen is gone.
//! A failed init marks the manager unavailable and disabled for the rest of the run.

use crate::models::PlayMode;
use camino::{Utf8Path, Utf8PathBuf};
use rand::seq::SliceRandom;
use std::process::{Child, Command, Stdio};
use thiserror::Error;

/// Upper bound on tracks picked into the playlist.
pub const MAX_PLAYLIST_SIZE: usize = 300;

/// `check_music_end` only polls the player once per this many frames.
pub const CHECK_INTERVAL_FRAMES: u32 = 30;

const TRACK_PLACEHOLDER: &str = "{track}";
const VOLUME_PLACEHOLDER: &str = "{volume}";

/// What the launcher needs from the music player.
#[cfg_attr(test, mockall::automock)]
pub trait BackgroundMusic {
    fn is_playing(&self) -> bool;
    fn is_enabled(&self) -> bool;
    fn play(&mut self);
    fn stop(&mut self);
}

#[derive(Error, Debug)]
pub enum BgmError {
    #[error("BGM player command is empty")]
    NoPlayer,

    #[error("BGM player not found: {0}")]
    PlayerNotFound(String),

    #[error("BGM directory not found: {0}")]
    DirectoryNotFound(Utf8PathBuf),

    #[error("No mp3/wav files in {0}")]
    NoTracks(Utf8PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Uninitialized,
    Ready,
    Unavailable,
}

#[derive(Debug)]
pub struct BgmManager {
    directory: Utf8PathBuf,
    player_command: String,
    readiness: Readiness,
    enabled: bool,
    playing: bool,
    volume: f32,
    mode: PlayMode,
    playlist: Vec<Utf8PathBuf>,
    play_order: Vec<usize>,
    current_index: usize,
    current_track: Option<Utf8PathBuf>,
    player: Option<Child>,
    frame_counter: u32,
}

impl BgmManager {
    /// `player_command` is split on whitespace; `{track}` and `{volume}` (0-100) are
    /// substituted per argument.
    pub fn new(directory: impl Into<Utf8PathBuf>, player_command: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            player_command: player_command.into(),
            readiness: Readiness::Uninitialized,
            enabled: true,
            playing: false,
            volume: 0.5,
            mode: PlayMode::Normal,
            playlist: Vec::new(),
            play_order: Vec::new(),
            current_index: 0,
            current_track: None,
            player: None,
            frame_counter: 0,
        }
    }

    /// Find the player and build the playlist. Only the first call does any work.
    pub fn ensure_ready(&mut self) -> bool {
        match self.readiness {
            Readiness::Ready => return true,
            Readiness::Unavailable => return false,
            Readiness::Uninitialized => {}
        }

        match self.initialize() {
            Ok(()) => {
                self.readiness = Readiness::Ready;
                tracing::info!("BGM ready with {} tracks", self.playlist.len());
                true
            }
            Err(e) => {
                tracing::warn!("BGM disabled: {}", e);
                self.readiness = Readiness::Unavailable;
                self.enabled = false;
                false
            }
        }
    }

    fn initialize(&mut self) -> Result<(), BgmError> {
        let program = self
            .player_command
            .split_whitespace()
            .next()
            .ok_or(BgmError::NoPlayer)?;
        let player = which::which(program)
            .map_err(|_| BgmError::PlayerNotFound(program.to_string()))?;
        tracing::debug!("BGM player: {}", player.display());

        let tracks = scan_tracks(&self.directory)?;
        if tracks.is_empty() {
            return Err(BgmError::NoTracks(self.directory.clone()));
        }

        self.build_playlist(tracks);
        Ok(())
    }

    fn build_playlist(&mut self, mut tracks: Vec<Utf8PathBuf>) {
        let mut rng = rand::thread_rng();
        if tracks.len() > MAX_PLAYLIST_SIZE {
            tracks = tracks
                .choose_multiple(&mut rng, MAX_PLAYLIST_SIZE)
                .cloned()
                .collect();
        }

        for (i, track) in tracks.iter().enumerate() {
            tracing::debug!("  {}. {}", i + 1, track.file_name().unwrap_or_default());
        }

        self.playlist = tracks;
        self.current_index = 0;
        self.update_play_order();
    }

    fn update_play_order(&mut self) {
        self.play_order = (0..self.playlist.len()).collect();
        if self.mode == PlayMode::Shuffle {
            self.play_order.shuffle(&mut rand::thread_rng());
        }
    }

    pub fn is_available(&self) -> bool {
        self.readiness != Readiness::Unavailable
    }

    pub fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Switching modes rebuilds the play order.
    pub fn set_mode(&mut self, mode: PlayMode) {
        if self.mode == mode {
            return;
        }
        tracing::debug!("BGM mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.update_play_order();
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Takes effect from the next track the player starts.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            if !self.playing {
                self.play();
            }
        } else if self.playing {
            self.stop();
        }
    }

    pub fn current_track_name(&self) -> &str {
        self.current_track
            .as_deref()
            .and_then(Utf8Path::file_name)
            .unwrap_or_default()
    }

    /// `"3/12"`, or `"No playlist"`.
    pub fn playlist_info(&self) -> String {
        if self.playlist.is_empty() {
            return "No playlist".to_string();
        }
        format!("{}/{}", self.current_index + 1, self.playlist.len())
    }

    pub fn play_next(&mut self) {
        if self.play_order.is_empty() {
            return;
        }

        self.current_index += 1;
        if self.current_index >= self.play_order.len() {
            tracing::debug!("Playlist finished, restarting from the beginning");
            self.current_index = 0;
        }
        self.play_current_track();
    }

    /// Call every frame; advances to the next track when the player has exited.
    pub fn check_music_end(&mut self) {
        if self.readiness != Readiness::Ready || !self.enabled || !self.playing {
            return;
        }

        self.frame_counter += 1;
        if self.frame_counter < CHECK_INTERVAL_FRAMES {
            return;
        }
        self.frame_counter = 0;

        let finished = match self.player.as_mut() {
            Some(child) => !matches!(child.try_wait(), Ok(None)),
            None => true,
        };
        if finished {
            tracing::debug!("Track ended, playing next");
            self.player = None;
            self.play_next();
        }
    }

    fn play_current_track(&mut self) {
        self.kill_player();

        if self.current_index >= self.play_order.len() {
            self.current_index = 0;
        }
        let Some(track) = self
            .play_order
            .get(self.current_index)
            .and_then(|&i| self.playlist.get(i))
            .cloned()
        else {
            return;
        };

        let args = render_player_args(&self.player_command, &track, self.volume);
        let Some((program, rest)) = args.split_first() else {
            return;
        };

        tracing::debug!(
            "Playing track {}/{}: {}",
            self.current_index + 1,
            self.play_order.len(),
            track
        );

        match Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                self.player = Some(child);
                self.current_track = Some(track);
                self.playing = true;
                self.frame_counter = 0;
            }
            Err(e) => {
                tracing::error!("Failed to start BGM player {}: {}", program, e);
                self.playing = false;
            }
        }
    }

    fn kill_player(&mut self) {
        if let Some(mut child) = self.player.take() {
            if let Err(e) = child.kill() {
                tracing::debug!("BGM player already gone: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl BackgroundMusic for BgmManager {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn play(&mut self) {
        if !self.ensure_ready() {
            tracing::debug!("BGM unavailable, not playing");
            return;
        }
        if !self.enabled {
            tracing::debug!("BGM disabled, not playing");
            return;
        }
        self.play_current_track();
    }

    fn stop(&mut self) {
        self.kill_player();
        if self.playing {
            tracing::debug!("BGM stopped");
        }
        self.playing = false;
    }
}

impl Drop for BgmManager {
    fn drop(&mut self) {
        self.kill_player();
    }
}

/// Recursively collect `.mp3` / `.wav` files, sorted by path.
pub fn scan_tracks(directory: &Utf8Path) -> Result<Vec<Utf8PathBuf>, BgmError> {
    if !directory.is_dir() {
        return Err(BgmError::DirectoryNotFound(directory.to_path_buf()));
    }

    let mut tracks = Vec::new();
    let mut pending = vec![directory.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match dir.read_dir_utf8() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping unreadable BGM directory {}: {}", dir, e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path.to_path_buf());
            } else if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3") || ext.eq_ignore_ascii_case("wav"))
            {
                tracks.push(path.to_path_buf());
            }
        }
    }

    tracks.sort();
    tracing::debug!("Found {} BGM files in {}", tracks.len(), directory);
    Ok(tracks)
}

fn render_player_args(template: &str, track: &Utf8Path, volume: f32) -> Vec<String> {
    let volume = ((volume * 100.0).round() as u32).to_string();
    template
        .split_whitespace()
        .map(|arg| {
            arg.replace(TRACK_PLACEHOLDER, track.as_str())
                .replace(VOLUME_PLACEHOLDER, &volume)
        })
        .collect()
}
