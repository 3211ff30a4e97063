//! Chapter position state for the story reader.
//!
//! The page address alone (`/story?id=<id>&c=<index>`) reconstructs the
//! view, so every control on the reader page is a link or form carrying
//! both parameters.

/// Current chapter index, bounded to `[0, chapters - 1]`.
pub struct ReaderState {
    chapters: usize,
    current: usize,
}

impl ReaderState {
    pub fn new(chapters: usize) -> Self {
        Self {
            chapters,
            current: 0,
        }
    }

    /// Moves to `index`, silently ignoring anything out of bounds.
    pub fn load(&mut self, index: usize) -> bool {
        if index >= self.chapters {
            return false;
        }

        self.current = index;

        true
    }

    pub fn current(&self) -> usize {
        self.current
    }
}

/// The canonical reader address for one chapter of one story.
#[derive(Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReaderAddress {
    pub id: i64,
    pub c: usize,
}

impl ReaderAddress {
    pub fn href(&self) -> String {
        format!("/story?id={}&c={}", self.id, self.c)
    }
}

#[derive(Debug, PartialEq)]
pub enum LinkState {
    Normal,
    Disabled,
}

pub struct NavLink {
    pub state: LinkState,
    pub href: String,
}

impl NavLink {
    pub fn class(&self) -> &'static str {
        match self.state {
            LinkState::Normal => "nav-button",
            LinkState::Disabled => "nav-button disabled",
        }
    }
}

/// Previous/next chapter links, disabled at the two boundaries.
pub struct ChapterNav {
    pub prev: NavLink,
    pub next: NavLink,
}

impl ChapterNav {
    pub fn new(story_id: i64, current: usize, chapters: usize) -> Self {
        let prev = if current == 0 {
            NavLink {
                state: LinkState::Disabled,
                href: "#".into(),
            }
        } else {
            NavLink {
                state: LinkState::Normal,
                href: ReaderAddress {
                    id: story_id,
                    c: current - 1,
                }
                .href(),
            }
        };

        let next = if current + 1 >= chapters {
            NavLink {
                state: LinkState::Disabled,
                href: "#".into(),
            }
        } else {
            NavLink {
                state: LinkState::Normal,
                href: ReaderAddress {
                    id: story_id,
                    c: current + 1,
                }
                .href(),
            }
        };

        Self { prev, next }
    }
}
