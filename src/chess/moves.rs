use pgn_reader::{Nag, RawComment, Reader, SanPlus, Skip, Visitor};
use std::io;
use std::ops::ControlFlow;

macro_rules! pgn_visitor_skip_variations {
    () => {
        fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
            ControlFlow::Continue(())
        }

        fn comment(
            &mut self,
            _: &mut Self::Movetext,
            _: RawComment<'_>,
        ) -> ControlFlow<Self::Output> {
            ControlFlow::Continue(())
        }

        fn partial_comment(
            &mut self,
            _: &mut Self::Movetext,
            _: RawComment<'_>,
        ) -> ControlFlow<Self::Output> {
            ControlFlow::Continue(())
        }

        fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
            ControlFlow::Continue(Skip(true))
        }
    };
}

/// Counts mainline half-moves; tags, comments, NAGs and variations are ignored.
#[derive(Default)]
struct PlyCounter {
    plies: u32,
}

impl Visitor for PlyCounter {
    type Tags = ();
    type Movetext = ();
    type Output = u32;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.plies = 0;
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn san(&mut self, _movetext: &mut Self::Movetext, _san: SanPlus) -> ControlFlow<Self::Output> {
        self.plies += 1;
        ControlFlow::Continue(())
    }

    pgn_visitor_skip_variations!();

    fn end_game(&mut self, _movetext: Self::Movetext) -> Self::Output {
        self.plies
    }
}

/// Mainline ply count of one game block, `None` when the block cannot be read as a game.
pub fn count_plies(pgn: &str) -> Option<u32> {
    if pgn.trim().is_empty() {
        return None;
    }

    let mut reader = Reader::new(io::Cursor::new(pgn.as_bytes()));
    let mut counter = PlyCounter::default();

    match reader.read_game(&mut counter) {
        Ok(Some(plies)) => Some(plies),
        Ok(None) | Err(_) => None,
    }
}
