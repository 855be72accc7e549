//! Built-in catalog data

use crate::catalog::{ColorPalette, Gender, GroupId, LayerCatalog, LayerGroup, Variant};

use Gender::{Female, Male};
use GroupId::*;

fn solid(entries: &[(u32, &str)]) -> Vec<ColorPalette> {
    entries
        .iter()
        .map(|(weight, color)| ColorPalette::new(*weight, &[*color]))
        .collect()
}

fn skin_colors() -> Vec<ColorPalette> {
    solid(&[
        (35, "#F9C9B6"),
        (30, "#E8B4A0"),
        (20, "#D4A08C"),
        (10, "#C08B78"),
        (5, "#FFDACB"),
    ])
}

fn hair_colors() -> Vec<ColorPalette> {
    solid(&[
        (15, "#000000"),
        (10, "#F4D150"),
        (10, "#FC909F"),
        (10, "#6BD9E9"),
        (10, "#9287FF"),
        (8, "#362100"),
        (8, "#562400"),
        (8, "#5B3800"),
        (8, "#FF4D6B"),
        (8, "#000056"),
        (8, "#CB7F50"),
        (8, "#F6CF45"),
        (8, "#876565"),
    ])
}

// Main color plus trim.
fn shirt_colors() -> Vec<ColorPalette> {
    [
        ["#000000", "#AFAFAF"],
        ["#ffffff", "#A1A1A1"],
        ["#F4D150", "#FFEBA4"],
        ["#FC909F", "#FFEDEF"],
        ["#6BD9E9", "#D2EFF3"],
        ["#9287FF", "#E0DDFF"],
        ["#E97C17", "#d4975e"],
        ["#B4B0CD", "#e4e2f1"],
        ["#878787", "#b6b6b6"],
        ["#CA475A", "#d86072"],
        ["#0C4F2F", "#3d8160"],
        ["#354161", "#579b7a"],
    ]
    .iter()
    .map(|pair| ColorPalette::new(1, pair))
    .collect()
}

fn facial_hair_colors() -> Vec<ColorPalette> {
    solid(&[(1, "#222F37"), (1, "#612507"), (1, "#F3D010")])
}

pub fn background_colors() -> Vec<ColorPalette> {
    solid(&[
        (15, "#E0DDFF"),
        (15, "#D2EFF3"),
        (15, "#FFEDEF"),
        (15, "#FFEBA4"),
        (10, "#F4D150"),
        (10, "#FC909F"),
        (10, "#6BD9E9"),
        (10, "#9287FF"),
    ])
}

fn plain(names: &[&str]) -> Vec<Variant> {
    names.iter().map(|name| Variant::template(name, 10)).collect()
}

fn hair(name: &str, gender: Gender) -> Variant {
    Variant::template(name, 10)
        .gender(gender)
        .palettes(hair_colors())
        .differs_from(&[Background])
}

fn hair_variants() -> Vec<Variant> {
    vec![
        hair("Danny Phantom", Male),
        hair("Double Ponytail", Female).excludes(&[FacialHair]),
        hair("Doug Funny", Male),
        hair("Fonze", Male),
        hair("Full", Female)
            .differs_from(&[Background, Shirt])
            .excludes(&[FacialHair]),
        hair("handsome", Male),
        Variant::template("Mr Clean", 10).gender(Male),
        hair("Mr T", Male),
        hair("Pixie", Female).excludes(&[FacialHair]),
        hair("QY-03", Gender::Unspecified),
        hair("QY-04", Female).excludes(&[FacialHair]),
        hair("QY-05", Male),
        hair("Turban", Gender::Unspecified),
        hair("爆炸头", Gender::Unspecified),
        hair("大波浪", Female),
        hair("齐刘海", Female),
        Variant { weight: 5, ..hair("秃头", Male) },
        hair("Short", Female),
    ]
}

fn background_variants() -> Vec<Variant> {
    let mut variants: Vec<Variant> = ["Blue", "Dark Blue", "Green", "Grey", "Red", "Yellow"]
        .iter()
        .map(|name| Variant::template(name, 10).palettes(background_colors()))
        .collect();
    variants.extend(plain(&[
        "clean",
        "pattern1",
        "pattern2",
        "pattern3",
        "pattern4",
        "pattern5",
        "pattern6",
        "pattern7",
        "pattern8",
        "pattern9",
        "Firecrackers",
        "fu",
        "lanterns",
    ]));
    variants
}

fn group(id: GroupId, dir: &str, description: &str, z_index: i32, variants: Vec<Variant>) -> LayerGroup {
    LayerGroup {
        id,
        dir: dir.to_string(),
        description: Some(description.to_string()),
        z_index,
        variants,
    }
}

pub fn catalog() -> LayerCatalog {
    let groups = vec![
        group(
            Base,
            "Base",
            "head",
            100,
            ["1", "QY-02"]
                .iter()
                .map(|name| Variant::template(name, 10).palettes(skin_colors()))
                .collect(),
        ),
        group(
            Ear,
            "Ear",
            "ears",
            500,
            ["Attached", "Detached"]
                .iter()
                .map(|name| Variant::template(name, 10).palettes(skin_colors()).follows(Base))
                .collect(),
        ),
        group(
            EarRing,
            "Ear Ring",
            "earrings",
            501,
            std::iter::once(Variant::empty(100))
                .chain(plain(&["Hoop", "Stud", "Firecrackers", "lanterns"]))
                .collect(),
        ),
        group(EyeBrows, "Eyebrows", "eyebrows", 200, {
            let mut variants = plain(&["dot", "Doubt"]);
            variants.push(Variant::template("Eyelashes Down-1", 10).gender(Female));
            variants.extend(plain(&["Eyelashes Down", "Eyelashes Up", "Up"]));
            variants
        }),
        group(
            Eyes,
            "Eyes",
            "eyes",
            200,
            plain(&[
                "stare",
                "Disdain",
                "Eyes",
                "Eyeshadow",
                "Large and small eyes",
                "Round",
                "Smiling",
            ]),
        ),
        group(
            FacialHair,
            "Facial Hair",
            "facial hair",
            201,
            vec![
                Variant::template("Scruff", 10)
                    .gender(Male)
                    .palettes(facial_hair_colors()),
                Variant::template("Default", 100),
            ],
        ),
        group(
            Glasses,
            "Glasses",
            "glasses",
            600,
            plain(&["Default", "Round", "Round-1", "egg", "star"]),
        ),
        group(Hair, "Hair", "hair", 400, hair_variants()),
        group(
            Headwear,
            "Headwear",
            "headwear",
            450,
            vec![
                Variant::empty(30),
                Variant::template("cowHorn", 2).celebrating(),
            ],
        ),
        group(Hat, "Hat", "hats", 401, plain(&["Default", "Christmas"])),
        group(
            Mouth,
            "Mouth",
            "mouth",
            202,
            plain(&[
                "Frown",
                "indifferent",
                "Laughing",
                "Nervous",
                "open",
                "Pucker",
                "QY-01",
                "Sad",
                "Smile-1",
                "Smile-2",
                "Smile",
            ]),
        ),
        group(Nose, "Nose", "nose", 203, plain(&["Default"])),
        group(
            Shirt,
            "Shirt",
            "shirt",
            200,
            ["Collared", "Crew", "Leisure", "Open", "chocker"]
                .iter()
                .map(|name| Variant::template(name, 10).palettes(shirt_colors()))
                .collect(),
        ),
        group(Background, "Background", "background", 0, background_variants()),
        group(
            Mask,
            "Mask",
            "masks",
            501,
            plain(&["Default", "3M", "Cyberpunk", "General"]),
        ),
    ];

    LayerCatalog {
        version: crate::ENGINE_VERSION.to_string(),
        engine_min_version: crate::MIN_ENGINE_VERSION.to_string(),
        groups,
        background_palettes: background_colors(),
    }
}
