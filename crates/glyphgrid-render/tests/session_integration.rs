//! End-to-end tests for the screen + session pipeline.
//!
//! Drives a headless session the way a host would:
//! - write → refresh → inspect pixels on the in-memory surface
//! - colour pairs, reverse video and bold through the glyph cache
//! - failed refreshes keeping undelivered cells queued
//! - key routing, raw mode and relayout notifications

use glyphgrid_core::{
    AttrWord, Color, Error, EventKind, InputEvent, KeyCode, KeyEvent, Propagation, color_pair,
};
use glyphgrid_render::{
    FontMetrics, GlyphCacheError, PixelSurface, ProceduralGlyphSource, RenderError, Screen,
    ScreenConfig, Session, Surface,
};
use std::cell::RefCell;
use std::rc::Rc;

type HeadlessScreen = Screen<PixelSurface, ProceduralGlyphSource>;

// ============================================================================
// Helpers
// ============================================================================

/// 10px procedural font: 6x12 cells.
fn config(rows: u16, cols: u16) -> ScreenConfig {
    ScreenConfig {
        rows,
        cols,
        font_size: 10,
        ..ScreenConfig::default()
    }
}

fn screen(rows: u16, cols: u16) -> HeadlessScreen {
    Screen::new(
        config(rows, cols),
        PixelSurface::new(0, 0),
        ProceduralGlyphSource::new(),
    )
    .expect("screen")
}

/// Every pixel of cell `(row, col)`.
fn cell_pixels(screen: &HeadlessScreen, row: u16, col: u16) -> Vec<[u8; 4]> {
    let rect = screen.metrics().cell_rect(row, col);
    let mut out = Vec::new();
    for y in rect.y..rect.y + rect.height {
        for x in rect.x..rect.x + rect.width {
            out.extend(screen.surface().pixel(x, y));
        }
    }
    out
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn write_ab_then_refresh() {
    let mut s = screen(3, 3);
    s.move_to(0, 0).expect("move");
    s.addstr("AB").expect("write");
    let frame = s.refresh().expect("refresh");
    assert_eq!(frame.cells_drawn, 2);
    assert_eq!(s.cache().len(), 2);
    assert_eq!(s.cursor(), (0, 2));
    assert_eq!(s.grid().pending_len(), 0);
}

#[test]
fn refresh_twice_writes_surface_once() {
    let mut s = screen(2, 4);
    s.addstr("text").expect("write");
    s.surface_mut().reset_counters();
    s.refresh().expect("refresh");
    assert_eq!(s.surface().blit_count(), 4);
    s.refresh().expect("refresh");
    assert_eq!(s.surface().write_count(), 4);
}

#[test]
fn reverse_video_swaps_rendered_colours() {
    let mut s = screen(1, 2);
    s.init_pair(1, Color::YELLOW, Color::BLUE);
    s.addstr_with(color_pair(1), " ").expect("write");
    s.addstr_with(color_pair(1) | AttrWord::REVERSE, " ").expect("write");
    s.refresh().expect("refresh");
    assert!(cell_pixels(&s, 0, 0).iter().all(|px| *px == Color::BLUE.to_rgba()));
    assert!(cell_pixels(&s, 0, 1).iter().all(|px| *px == Color::YELLOW.to_rgba()));
}

#[test]
fn visible_glyph_uses_foreground_colour() {
    let mut s = screen(1, 1);
    s.init_pair(2, Color::CYAN, Color::BLACK);
    s.addstr_with(color_pair(2), "W").expect("write");
    s.refresh().expect("refresh");
    let pixels = cell_pixels(&s, 0, 0);
    assert_eq!(pixels[0], Color::CYAN.to_rgba());
    assert!(pixels.contains(&Color::BLACK.to_rgba()));
}

#[test]
fn bold_cells_render_heavier_than_plain() {
    let mut s = screen(1, 2);
    s.addstr("W").expect("write");
    s.addstr_with(AttrWord::BOLD, "W").expect("write");
    s.refresh().expect("refresh");
    let fg = Color::WHITE.to_rgba();
    let inked = |col| cell_pixels(&s, 0, col).iter().filter(|px| **px == fg).count();
    assert!(inked(1) > inked(0));
}

#[test]
fn undefined_pair_keeps_changes_queued_until_defined() {
    let mut s = screen(1, 4);
    s.addstr("ok").expect("write");
    s.addstr_with(color_pair(9), "no").expect("write");
    let err = s.refresh().expect_err("pair 9 undefined");
    assert_eq!(err, RenderError::Glyph(GlyphCacheError::UndefinedPair(9)));
    assert_eq!(s.grid().pending_len(), 2);

    s.init_pair(9, Color::RED, Color::BLACK);
    let frame = s.refresh().expect("refresh");
    assert_eq!(frame.cells_drawn, 2);
    assert_eq!(s.grid().pending_len(), 0);
}

#[test]
fn overflowing_write_commits_prefix() {
    let mut s = screen(2, 2);
    let err = s.addstr("ABCDE").expect_err("overflow");
    assert_eq!(
        err,
        RenderError::Core(Error::Overflow {
            written: 4,
            requested: 5
        })
    );
    assert_eq!(s.grid().row_text(0).as_deref(), Some("AB"));
    assert_eq!(s.grid().row_text(1).as_deref(), Some("CD"));
}

#[test]
fn out_of_bounds_move_is_reported() {
    let mut s = screen(2, 2);
    let err = s.addstr_at(5, 0, "x").expect_err("out of bounds");
    assert!(matches!(err, RenderError::Core(Error::OutOfBounds { .. })));
    assert_eq!(s.cursor(), (0, 0));
    assert_eq!(s.grid().pending_len(), 0);
}

#[test]
fn glyph_cache_pages_grow_with_distinct_glyphs() {
    let mut s = Screen::new(
        ScreenConfig {
            glyphs_per_page: 4,
            ..config(1, 10)
        },
        PixelSurface::new(0, 0),
        ProceduralGlyphSource::new(),
    )
    .expect("screen");
    s.addstr("abcdefghij").expect("write");
    s.refresh().expect("refresh");
    let stats = s.cache().stats();
    assert_eq!(stats.glyphs, 10);
    assert_eq!(stats.pages, 3);
}

#[test]
fn font_change_redraws_at_new_metrics() {
    let mut s = screen(1, 3);
    s.addstr("abc").expect("write");
    s.refresh().expect("refresh");
    s.set_font(glyphgrid_render::FontSpec::new("mono", 15));
    assert_eq!(s.metrics(), FontMetrics::new(9, 17));
    assert_eq!(s.surface().size(), (27, 17));
    let frame = s.refresh().expect("refresh");
    assert_eq!(frame.cells_drawn, 3);
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn getch_loop_echoes_letters() {
    let mut session = Session::new(screen(1, 5));
    session.ongetch(|cx, event| match event.key().and_then(|k| k.code.as_letter()) {
        Some(letter) => {
            let _ = cx.addch(letter);
            let _ = cx.refresh();
            Propagation::Suppress
        }
        None => Propagation::Unset,
    });
    for code in [72, 69, 89] {
        assert!(!session.key_down(KeyEvent::plain(KeyCode(code))));
    }
    assert!(session.key_down(KeyEvent::plain(KeyCode::LEFT)));
    assert_eq!(
        session.screen().grid().row_text(0).as_deref(),
        Some("HEY  ")
    );
    assert_eq!(session.screen().grid().pending_len(), 0);
}

#[test]
fn chained_getch_reads_successive_keys() {
    let mut session = Session::new(screen(1, 1));
    let keys = Rc::new(RefCell::new(Vec::new()));
    let first = Rc::clone(&keys);
    session.getch(move |cx, event| {
        first.borrow_mut().extend(event.key().map(|k| k.code));
        let second = Rc::clone(&first);
        cx.subscribe(EventKind::KeyDown, true, move |_, event| {
            second.borrow_mut().extend(event.key().map(|k| k.code));
            Propagation::Unset
        });
        Propagation::Unset
    });
    session.key_down(KeyEvent::plain(KeyCode::UP));
    session.key_down(KeyEvent::plain(KeyCode::DOWN));
    session.key_down(KeyEvent::plain(KeyCode::ESC));
    assert_eq!(*keys.borrow(), vec![KeyCode::UP, KeyCode::DOWN]);
    assert!(session.router().is_empty());
}

#[test]
fn relayout_tells_getch_consumers_about_resize() {
    let mut session = Session::from_config(
        ScreenConfig {
            auto_width: true,
            min_width: 4,
            ..config(2, 8)
        },
        PixelSurface::new(0, 0),
        ProceduralGlyphSource::new(),
    )
    .expect("session");
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    session.getch(move |cx, event| {
        log.borrow_mut().push(*event);
        if event.is_resize() {
            let _ = cx.addstr_at(0, 0, "resized");
        }
        Propagation::Unset
    });

    // 120px / 6px = 20 columns.
    assert_eq!(session.layout_changed(120, 999), Some((2, 20)));
    assert_eq!(*seen.borrow(), vec![InputEvent::Resize { rows: 2, cols: 20 }]);
    assert_eq!(session.screen().surface().size(), (120, 24));
    assert!(
        session
            .screen()
            .grid()
            .row_text(0)
            .is_some_and(|row| row.starts_with("resized"))
    );
    // The one-shot is gone; the next key reaches nobody.
    assert!(session.key_down(KeyEvent::plain(KeyCode::ENTER)));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn shrink_keeps_surviving_pixels() {
    let mut session = Session::from_config(
        ScreenConfig {
            auto_height: true,
            auto_width: true,
            ..config(3, 3)
        },
        PixelSurface::new(0, 0),
        ProceduralGlyphSource::new(),
    )
    .expect("session");
    let screen = session.screen_mut();
    screen.init_pair(1, Color::GREEN, Color::RED);
    screen.addstr_with(color_pair(1), " ").expect("write");
    screen.refresh().expect("refresh");

    assert_eq!(session.layout_changed(6, 12), Some((1, 1)));
    let s = session.screen();
    assert_eq!(s.surface().size(), (6, 12));
    assert!(cell_pixels(s, 0, 0).iter().all(|px| *px == Color::RED.to_rgba()));
}
