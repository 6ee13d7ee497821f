// this_file: crates/texform-formula/src/layout.rs

//! Atom tree to box tree.

use crate::atom::Atom;
use crate::boxes::{BoxKind, TexBox};
use crate::constants::{AtomType, FontType, TexStyle};
use crate::environment::Environment;
use log::trace;

/// Delimiter space added on both sides of a fraction, in em.
const NULL_DELIMITER_SPACE: f32 = 0.12;
/// Space after a sub/superscript, in em.
const SCRIPT_SPACE: f32 = 0.05;
/// Gap between a frame and its content, in em.
const FRAME_SEP: f32 = 0.15;
/// Leading between stacked lines, in em.
const LINE_GAP: f32 = 0.2;

/// Inter-atom glue: 0 none, 1 thin, 2 medium, 3 thick. Negative entries vanish in script
/// styles, as do medium and thick glue.
const GLUE: [[i8; 8]; 8] = [
    [0, 1, 2, 3, 0, 0, 0, -1],
    [1, 1, 0, 3, 0, 0, 0, -1],
    [2, 2, 0, 0, 2, 0, 0, 2],
    [3, 3, 0, 0, 3, 0, 0, 3],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 2, 3, 0, 0, 0, -1],
    [-1, -1, 0, -1, -1, -1, -1, -1],
    [-1, 1, 2, 3, -1, 0, -1, -1],
];

fn spacing_index(kind: AtomType) -> usize {
    if kind.is_spacing_class() {
        kind.code() as usize
    } else {
        0
    }
}

/// Glue between two neighbouring atoms, in mu.
pub fn glue_mu(left: AtomType, right: AtomType, style: TexStyle) -> f32 {
    let entry = GLUE[spacing_index(left)][spacing_index(right)];
    match (entry, style.is_script()) {
        (1, _) | (-1, false) => 3.0,
        (2, false) => 4.0,
        (3, false) => 5.0,
        _ => 0.0,
    }
}

/// Lay out one atom.
pub fn create_box(atom: &Atom, env: &Environment) -> TexBox {
    let style = env.style();
    let font = env.font();
    match atom {
        Atom::Empty | Atom::BreakMark => TexBox::empty(),
        Atom::Char { ch } => char_box(*ch, env),
        Atom::Symbol { ch, kind, .. } => {
            let b = char_box(*ch, env);
            if *kind == AtomType::BigOperator {
                let b = if style.is_display() {
                    TexBox::scaled(b, 1.4, 1.4)
                } else {
                    b
                };
                // centre on the math axis
                let shift = (b.height - b.depth) / 2.0 - font.axis_height(style);
                TexBox::horizontal(vec![b.with_shift(shift)])
            } else {
                b
            }
        }
        Atom::Row(items) => row_box(items, env),
        Atom::Typed { base, .. } => create_box(base, env),
        Atom::Color {
            base,
            background,
            foreground,
        } => {
            env.mark_colored();
            // colors go on the inner box itself so that its break positions survive;
            // colors set further in win
            let mut b = create_box(base, env);
            b.foreground = b.foreground.or(*foreground);
            b.background = b.background.or(*background);
            b
        }
        Atom::Fraction {
            numerator,
            denominator,
        } => fraction_box(numerator, denominator, env),
        Atom::Scripts { base, sup, sub } => {
            scripts_box(base, sup.as_deref(), sub.as_deref(), env)
        }
        Atom::Sqrt { base, index } => sqrt_box(base, index.as_deref(), env),
        Atom::Space(kind) => TexBox::kern(kind.mu() * font.mu(style)),
        Atom::Strut {
            width,
            height,
            depth,
        } => TexBox::strut(env.length(*width), env.length(*height), env.length(*depth)),
        Atom::Text { text, font: external } => {
            let family = if font.font_type().contains(FontType::SANS_SERIF) {
                &external.sans_serif
            } else {
                &external.serif
            };
            trace!(target: "texform::layout", "text run {text:?} in {family}");
            let roman = env.with_font_type(FontType::ROMAN);
            TexBox::horizontal(text.chars().map(|ch| char_box(ch, &roman)).collect())
        }
        Atom::Styled { font_type, base } => create_box(base, &env.with_font_type(*font_type)),
        Atom::Middle(middle) => char_box(middle.delimiter, env),
        Atom::VCentered(base) => {
            let b = create_box(base, env);
            let total = b.total_height();
            let height = total / 2.0 + font.axis_height(style);
            let shift = b.height - height;
            TexBox::horizontal(vec![b.with_shift(shift)])
        }
        Atom::Framed(base) => TexBox::framed(
            create_box(base, env),
            font.rule_thickness(style),
            FRAME_SEP * style.size_factor(),
        ),
        Atom::Oval(base) => TexBox::oval(
            create_box(base, env),
            font.rule_thickness(style),
            FRAME_SEP * style.size_factor(),
        ),
        Atom::Circled(base) => TexBox::circled(
            create_box(base, env),
            font.rule_thickness(style),
            0.05 * style.size_factor(),
        ),
        Atom::Rotated { base, degrees } => TexBox::rotated(create_box(base, env), *degrees),
        Atom::Scaled { base, x, y } => TexBox::scaled(create_box(base, env), *x, *y),
        Atom::Lines { rows, align } => {
            let boxes: Vec<TexBox> = rows.iter().map(|row| create_box(row, env)).collect();
            let width = boxes.iter().map(|b| b.width).fold(0.0_f32, f32::max);
            let first_height = boxes.first().map_or(0.0, |b| b.height);
            let mut children = Vec::with_capacity(boxes.len() * 2);
            for (idx, b) in boxes.into_iter().enumerate() {
                if idx > 0 {
                    children.push(TexBox::strut(0.0, LINE_GAP * style.size_factor(), 0.0));
                }
                children.push(TexBox::aligned(b, width, *align));
            }
            TexBox::vertical(children, first_height)
        }
    }
}

fn char_box(ch: char, env: &Environment) -> TexBox {
    let font = env.font();
    let style = env.style();
    let m = font.char_metrics(ch, style);
    TexBox::glyph(
        ch,
        m.width + m.italic,
        m.height,
        m.depth,
        font.rule_thickness(style) * font.weight(),
    )
}

fn row_box(items: &[Atom], env: &Environment) -> TexBox {
    let style = env.style();
    let mu = env.font().mu(style);
    let mut children: Vec<TexBox> = Vec::with_capacity(items.len());
    let mut breaks = Vec::new();
    let mut middles = Vec::new();
    let mut prev: Option<AtomType> = None;

    for atom in items {
        match atom {
            Atom::BreakMark => {
                breaks.push(children.len());
                continue;
            }
            _ if atom.is_glue_neutral() => {
                children.push(create_box(atom, env));
                continue;
            }
            _ => {}
        }

        let mut left = atom.left_type();
        // a binary operator with nothing to operate on acts as ordinary
        if left == AtomType::BinaryOperator
            && matches!(
                prev,
                None | Some(
                    AtomType::BinaryOperator
                        | AtomType::BigOperator
                        | AtomType::Relation
                        | AtomType::Opening
                        | AtomType::Punctuation
                )
            )
        {
            left = AtomType::Ordinary;
        }
        if let Some(prev) = prev {
            let glue = glue_mu(prev, left, style);
            if glue > 0.0 {
                children.push(TexBox::kern(glue * mu));
            }
        }
        if matches!(atom, Atom::Middle(_)) {
            middles.push(children.len());
        }
        children.push(create_box(atom, env));
        prev = Some(if left == AtomType::Ordinary && atom.right_type() == AtomType::BinaryOperator {
            AtomType::Ordinary
        } else {
            atom.right_type()
        });
    }

    if !middles.is_empty() {
        stretch_middles(&mut children, &middles);
    }
    TexBox::horizontal_with_breaks(children, breaks)
}

/// Grow `\middle` delimiters to the extent of the rest of the row.
fn stretch_middles(children: &mut [TexBox], middles: &[usize]) {
    let (height, depth) = children
        .iter()
        .enumerate()
        .filter(|(idx, _)| !middles.contains(idx))
        .fold((0.0_f32, 0.0_f32), |(h, d), (_, c)| {
            (h.max(c.height - c.shift), d.max(c.depth + c.shift))
        });
    for &idx in middles {
        let child = &mut children[idx];
        if let BoxKind::Glyph { .. } = child.kind {
            child.height = child.height.max(height);
            child.depth = child.depth.max(depth);
        }
    }
}

fn fraction_box(numerator: &Atom, denominator: &Atom, env: &Environment) -> TexBox {
    let style = env.style();
    let font = env.font();
    let num = create_box(numerator, &env.num_style());
    let den = create_box(denominator, &env.denom_style());
    let theta = font.rule_thickness(style);
    let axis = font.axis_height(style);
    let clearance = if style.is_display() { 3.0 * theta } else { theta };

    let width = num.width.max(den.width);
    let mut num_shift = font.num_shift(style);
    let mut den_shift = font.denom_shift(style);
    let gap_above = (num_shift - num.depth) - (axis + theta / 2.0);
    if gap_above < clearance {
        num_shift += clearance - gap_above;
    }
    let gap_below = (axis - theta / 2.0) - (den.height - den_shift);
    if gap_below < clearance {
        den_shift += clearance - gap_below;
    }
    let gap_above = (num_shift - num.depth) - (axis + theta / 2.0);
    let gap_below = (axis - theta / 2.0) - (den.height - den_shift);

    let height = num_shift + num.height;
    let stack = TexBox::vertical(
        vec![
            TexBox::aligned(num, width, crate::constants::Alignment::Center),
            TexBox::strut(0.0, gap_above, 0.0),
            TexBox::rule(width, theta, 0.0),
            TexBox::strut(0.0, gap_below, 0.0),
            TexBox::aligned(den, width, crate::constants::Alignment::Center),
        ],
        height,
    );
    let space = NULL_DELIMITER_SPACE * style.size_factor();
    TexBox::horizontal(vec![TexBox::kern(space), stack, TexBox::kern(space)])
}

fn scripts_box(base: &Atom, sup: Option<&Atom>, sub: Option<&Atom>, env: &Environment) -> TexBox {
    let style = env.style();
    let font = env.font();
    let b = create_box(base, env);
    let theta = font.rule_thickness(style);
    let mut shift_up = font.sup_shift(style).max(b.height - 0.386 * style.size_factor());
    let mut shift_down = font.sub_shift(style).max(b.depth + 0.05 * style.size_factor());

    let sup_box = sup.map(|atom| create_box(atom, &env.sup_style()));
    let sub_box = sub.map(|atom| create_box(atom, &env.sub_style()));

    let scripts = match (sup_box, sub_box) {
        (Some(sup), None) => {
            shift_up = shift_up.max(sup.depth + font.x_height(style) / 4.0);
            sup.with_shift(-shift_up)
        }
        (None, Some(sub)) => {
            shift_down = shift_down.max(sub.height - 0.8 * font.x_height(style));
            sub.with_shift(shift_down)
        }
        (Some(sup), Some(sub)) => {
            let gap = (shift_up - sup.depth) - (sub.height - shift_down);
            if gap < 4.0 * theta {
                shift_down += 4.0 * theta - gap;
            }
            let gap = (shift_up - sup.depth) - (sub.height - shift_down);
            let height = shift_up + sup.height;
            TexBox::vertical(vec![sup, TexBox::strut(0.0, gap, 0.0), sub], height)
        }
        (None, None) => return b,
    };
    TexBox::horizontal(vec![
        b,
        scripts,
        TexBox::kern(SCRIPT_SPACE * style.size_factor()),
    ])
}

fn sqrt_box(base: &Atom, index: Option<&Atom>, env: &Environment) -> TexBox {
    let style = env.style();
    let font = env.font();
    let b = create_box(base, &env.cramp_style());
    let theta = font.rule_thickness(style);
    let phi = if style.is_display() {
        font.x_height(style)
    } else {
        theta
    };
    let clearance = theta + phi / 4.0;
    let sign_width = 0.833 * style.size_factor();

    let height = b.height + clearance + theta;
    let depth = b.depth;
    let sign = TexBox::radical_sign(sign_width, height, depth, theta * font.weight());
    let body = TexBox::vertical(
        vec![
            TexBox::rule(b.width, theta, 0.0),
            TexBox::strut(0.0, clearance, 0.0),
            b,
        ],
        height,
    );

    let mut children = Vec::with_capacity(4);
    if let Some(index) = index {
        let idx = create_box(index, &env.root_style());
        let raise = 0.6 * (height + depth) - depth;
        let kern = -(idx.width.min(0.5 * sign_width));
        children.push(idx.with_shift(-raise));
        children.push(TexBox::kern(kern));
    }
    children.push(sign);
    children.push(body);
    TexBox::horizontal(children)
}
