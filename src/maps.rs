//! Authored board layouts. Pairs are `(entry, exit)`: head→tail for snakes,
//! bottom→top for ladders, listed in ascending entry order.

pub const PRESET_COUNT: u8 = 10;

pub struct FixedMap {
    pub snakes: &'static [(u8, u8)],
    pub ladders: &'static [(u8, u8)],
}

/// The classic layout. Difficulty never changes it.
pub const DEFAULT_MAP: FixedMap = FixedMap {
    snakes: &[
        (16, 6),
        (47, 26),
        (49, 11),
        (56, 53),
        (62, 19),
        (64, 60),
        (87, 24),
        (93, 73),
        (95, 75),
        (98, 78),
    ],
    ladders: &[
        (1, 38),
        (4, 14),
        (9, 21),
        (21, 42),
        (28, 84),
        (36, 44),
        (51, 67),
        (71, 91),
        (80, 99),
    ],
};

/// Snakes hard mode tries to add on top of a preset.
pub const HARD_EXTRA_SNAKES: [(u8, u8); 3] = [(16, 6), (47, 26), (49, 11)];

pub const PRESET_MAPS: [FixedMap; PRESET_COUNT as usize] = [
    FixedMap {
        snakes: &[(16, 6), (49, 11), (56, 37), (64, 45), (87, 24), (95, 75), (98, 78)],
        ladders: &[
            (4, 14),
            (9, 31),
            (21, 42),
            (28, 84),
            (36, 57),
            (51, 67),
            (71, 91),
            (80, 100),
        ],
    },
    FixedMap {
        snakes: &[
            (32, 10),
            (48, 26),
            (49, 11),
            (56, 53),
            (62, 18),
            (87, 36),
            (93, 73),
            (99, 80),
        ],
        ladders: &[
            (3, 22),
            (8, 26),
            (20, 29),
            (27, 83),
            (35, 44),
            (50, 67),
            (70, 90),
            (88, 99),
        ],
    },
    FixedMap {
        snakes: &[
            (24, 5),
            (37, 3),
            (43, 17),
            (54, 34),
            (69, 33),
            (83, 27),
            (92, 51),
            (97, 76),
        ],
        ladders: &[
            (6, 25),
            (11, 40),
            (23, 67),
            (45, 84),
            (52, 68),
            (61, 79),
            (74, 92),
            (85, 97),
        ],
    },
    FixedMap {
        snakes: &[(31, 14), (39, 5), (47, 19), (65, 52), (77, 16), (89, 53), (96, 42)],
        ladders: &[(2, 23), (13, 46), (24, 56), (35, 64), (41, 77), (58, 91), (66, 85)],
    },
    FixedMap {
        snakes: &[(29, 7), (34, 12), (46, 25), (58, 37), (75, 32), (86, 59), (94, 72)],
        ladders: &[(5, 18), (15, 44), (26, 48), (38, 81), (49, 63), (57, 76), (69, 88)],
    },
    FixedMap {
        snakes: &[(26, 9), (33, 15), (45, 22), (59, 38), (73, 41), (84, 63), (91, 68)],
        ladders: &[(7, 29), (16, 47), (28, 52), (40, 62), (53, 74), (65, 82), (78, 95)],
    },
    FixedMap {
        snakes: &[(25, 8), (32, 13), (44, 21), (57, 35), (71, 49), (81, 60), (88, 67)],
        ladders: &[(10, 33), (17, 50), (30, 55), (42, 66), (54, 75), (67, 86), (79, 96)],
    },
    FixedMap {
        snakes: &[(24, 6), (30, 11), (42, 20), (55, 34), (68, 46), (78, 57), (85, 64)],
        ladders: &[(12, 35), (19, 51), (32, 58), (44, 69), (56, 77), (70, 87), (81, 97)],
    },
    FixedMap {
        snakes: &[(22, 4), (28, 10), (41, 18), (53, 31), (66, 43), (76, 54), (82, 61)],
        ladders: &[(14, 37), (21, 53), (34, 61), (46, 71), (59, 79), (72, 89), (83, 98)],
    },
    FixedMap {
        snakes: &[(21, 3), (27, 8), (39, 16), (51, 29), (63, 40), (74, 52), (79, 58)],
        ladders: &[(1, 20), (18, 45), (36, 64), (48, 73), (60, 81), (75, 90), (85, 99)],
    },
];

/// Preset `id` (1-based). Unknown ids get the first preset.
pub fn preset(id: u8) -> &'static FixedMap {
    let index = (id as usize).saturating_sub(1);
    PRESET_MAPS.get(index).unwrap_or(&PRESET_MAPS[0])
}
