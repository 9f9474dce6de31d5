//! Left/right bone name mirroring.

const SEPARATORS: [char; 4] = ['.', '_', '-', ' '];

fn swap_side(side: &str) -> Option<&'static str> {
    Some(match side {
        "L" => "R",
        "R" => "L",
        "l" => "r",
        "r" => "l",
        "Left" => "Right",
        "Right" => "Left",
        "left" => "right",
        "right" => "left",
        "LEFT" => "RIGHT",
        "RIGHT" => "LEFT",
        _ => return None,
    })
}

/// Mirror a bone name across the left/right convention.
///
/// Recognizes a side token separated from the rest of the name by `.`, `_`, `-` or a
/// space, as a suffix (`arm.L`, `arm_l`) or a prefix (`L_arm`, `Left arm`). A number
/// suffix (`arm.L.001`) is kept. Names without a side token are returned unchanged.
pub fn symmetrical_name(name: &str) -> String {
    let (stem, number) = match name.rsplit_once('.') {
        Some((stem, digits))
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) =>
        {
            (stem, Some(digits))
        }
        _ => (name, None),
    };

    let mirrored = mirror_suffix(stem).or_else(|| mirror_prefix(stem));
    match (mirrored, number) {
        (Some(m), Some(n)) => format!("{m}.{n}"),
        (Some(m), None) => m,
        (None, _) => name.to_string(),
    }
}

fn mirror_suffix(stem: &str) -> Option<String> {
    let index = stem.rfind(&SEPARATORS[..])?;
    let (head, tail) = stem.split_at(index + 1);
    swap_side(tail).map(|side| format!("{head}{side}"))
}

fn mirror_prefix(stem: &str) -> Option<String> {
    let index = stem.find(&SEPARATORS[..])?;
    let (side, rest) = stem.split_at(index);
    swap_side(side).map(|side| format!("{side}{rest}"))
}
