//! The standard petition catalog.
//!
//! Ported from the original "Sort the Chat" event table, reduced to the
//! three-stat model. A few petitions attach timed modifiers instead of (or
//! on top of) one-shot deltas.

use crate::card::{Branch, EventCard, ModifierTemplate, Outcome};
use crate::state::Effects;

const fn fx(treasury: i64, happiness: i64, population: i64) -> Effects {
    Effects {
        treasury,
        happiness,
        population,
    }
}

static GOBLIN_BATTLE: &[Outcome] = &[
    Outcome::weighted(
        10,
        "A stunning victory! Your troops crushed the goblins and found their treasure stash!",
        fx(75, 15, 0),
    ),
    Outcome::weighted(
        15,
        "A stunning victory! Your guards routed the goblins before they reached the farms.",
        fx(0, 15, 0),
    ),
    Outcome::weighted(
        50,
        "You repel the goblins, but not without cost. The western farms are safe, for now.",
        fx(-10, 10, -5),
    ),
    Outcome::weighted(
        25,
        "The goblins were more numerous than expected! They broke your lines and pillaged freely before retreating.",
        fx(-20, -15, -5),
    ),
];

static KID_TREASURE: &[Outcome] = &[
    Outcome::weighted(
        5,
        "He found a dragon's nest and snagged a giant gem while it slept!",
        fx(500, 0, 0),
    ),
    Outcome::weighted(
        25,
        "He stumbled upon a goblin treasure hoard!",
        fx(200, 0, 0),
    ),
    Outcome::weighted(
        50,
        "He found a lost merchant's purse on the road.",
        fx(50, 0, 0),
    ),
    Outcome::weighted(
        20,
        "He proudly presents you with a... weirdly shaped rock.",
        fx(1, 0, 0),
    ),
];

pub static STANDARD_CARDS: &[EventCard] = &[
    EventCard {
        petitioner: "A Farmer",
        prompt: "My liege, a terrible blight has struck our fields! We need 50 gold for new seeds or we'll starve.",
        on_yes: Branch::Single(Outcome::flat(
            "The farmers are grateful! They begin replanting with the funds you provided.",
            fx(-50, 15, 5),
        )),
        on_no: Branch::Single(Outcome::flat(
            "The farmers despair. The blight spreads, and the harvest is meager.",
            fx(0, -15, -10),
        )),
    },
    EventCard {
        petitioner: "An Old Grandma",
        prompt: "Oh, dearie. I'd love a nice cup of coffee from the tavern, but I'm just a few coins short. Could you spare a bit of gold for an old woman?",
        on_yes: Branch::Single(Outcome::flat(
            "She blesses you with a warm smile. The tavern patrons notice your kindness.",
            fx(-3, 3, 0),
        )),
        on_no: Branch::Single(Outcome::flat(
            "She shuffles away sadly. It was only a few coins.",
            Effects::NONE,
        )),
    },
    EventCard {
        petitioner: "A Traveling Circus",
        prompt: "For 30 gold, our circus will perform and lift the spirits of your citizens!",
        on_yes: Branch::Single(Outcome::flat("The circus is a hit!", fx(-30, 25, 0))),
        on_no: Branch::Single(Outcome::flat(
            "The circus packs up and leaves.",
            fx(0, -5, 0),
        )),
    },
    EventCard {
        petitioner: "A Shady Merchant",
        prompt: "Psst... a small investment of 20 gold could double your return!",
        on_yes: Branch::Single(Outcome::flat("The gamble pays off!", fx(20, 0, 0))),
        on_no: Branch::Single(Outcome::flat("You wisely refuse.", fx(0, 5, 0))),
    },
    EventCard {
        petitioner: "A Scout",
        prompt: "Goblins are raiding the western farms! We must act!",
        on_yes: Branch::Weighted(GOBLIN_BATTLE),
        on_no: Branch::Single(Outcome::flat(
            "You decide not to risk an engagement. The goblins raid several farms before retreating.",
            fx(-20, -15, -10),
        )),
    },
    EventCard {
        petitioner: "The Guard Captain",
        prompt: "A group of 20 migrants has arrived at the gates, seeking refuge.",
        on_yes: Branch::Single(Outcome::flat(
            "You welcome them. They are hardworking and grateful.",
            fx(0, 5, 20),
        )),
        on_no: Branch::Single(Outcome::flat(
            "You turn the migrants away.",
            fx(0, -10, 0),
        )),
    },
    EventCard {
        petitioner: "A handsome, well-dressed man",
        prompt: "Greetings. I represent a foreign power with vast resources. I can solve your financial woes instantly. All I ask for is a small tithe of your population. Say, 10 souls?",
        on_yes: Branch::Single(Outcome::flat(
            "He smiles, and it doesn't reach his eyes. 'The payment has been collected.'",
            fx(200, -25, -10),
        )),
        on_no: Branch::Single(Outcome::flat(
            "He vanishes in a puff of smoke. Your moral clarity inspires your people.",
            fx(0, 5, 5),
        )),
    },
    EventCard {
        petitioner: "An Eager-Eyed Kid",
        prompt: "Your Majesty! I'm going on a grand adventure! I just need a bit of funding. Please?",
        on_yes: Branch::Weighted(KID_TREASURE),
        on_no: Branch::Single(Outcome::flat(
            "The kid's face falls. He kicks a rock and trudges away.",
            fx(0, -10, 0),
        )),
    },
    EventCard {
        petitioner: "An Eccentric Alchemist",
        prompt: "Behold! My 'Elixir of Fortitude'! For just 40 gold, I can supply it to your citizens. Their spirits will soar!",
        on_yes: Branch::Single(
            Outcome::flat(
                "The alchemist mixes a bubbling green potion. The effects linger for days.",
                fx(-40, 0, 0),
            )
            .with_modifier(ModifierTemplate {
                source: "Elixir of Fortitude",
                days: 3,
                effects: fx(0, 2, 0),
            }),
        ),
        on_no: Branch::Single(Outcome::flat(
            "'Your loss!' the alchemist mutters, storming off.",
            Effects::NONE,
        )),
    },
    EventCard {
        petitioner: "A Pragmatic Inventor",
        prompt: "Your Majesty, I have designed a new type of plow that could revolutionize our farming. I need 100 gold to build the prototypes.",
        on_yes: Branch::Single(
            Outcome::flat(
                "The investment pays off! The new plows spread from village to village.",
                fx(-100, 0, 0),
            )
            .with_modifier(ModifierTemplate {
                source: "New plows",
                days: 5,
                effects: fx(0, 0, 3),
            }),
        ),
        on_no: Branch::Single(Outcome::flat(
            "The inventor sadly packs up her blueprints and seeks a more forward-thinking patron.",
            fx(0, -5, 0),
        )),
    },
    EventCard {
        petitioner: "A Guild Envoy",
        prompt: "Sire, invest 100 gold in the merchant guilds and they will share their profits for a time.",
        on_yes: Branch::Single(
            Outcome::flat(
                "The guilds accept your coin. Dividends begin to flow.",
                fx(-100, 0, 0),
            )
            .with_modifier(ModifierTemplate {
                source: "Guild dividends",
                days: 5,
                effects: fx(25, 0, 0),
            }),
        ),
        on_no: Branch::Single(Outcome::flat(
            "'A missed opportunity,' the envoy notes, and departs.",
            Effects::NONE,
        )),
    },
    EventCard {
        petitioner: "A Stressed Diplomat",
        prompt: "A dispute has arisen with a neighboring kingdom over border territories. We can press our claim, or seek a peaceful resolution.",
        on_yes: Branch::Single(Outcome::flat(
            "You press the claim. The neighbor backs down, for now, but your people fear what comes next.",
            fx(0, -5, 0),
        )),
        on_no: Branch::Single(Outcome::flat(
            "You cede the disputed land to maintain peace. Your neighbor is pleased, but some of your people see it as weakness.",
            fx(20, -10, 0),
        )),
    },
    EventCard {
        petitioner: "A Worried Physician",
        prompt: "My liege, there are rumors of sickness in the lower quarter. For 30 gold I can quarantine it before it spreads.",
        on_yes: Branch::Single(Outcome::flat(
            "The quarantine holds. The lower quarter grumbles, then recovers.",
            fx(-30, 5, 0),
        )),
        on_no: Branch::Single(
            Outcome::flat(
                "You dismiss the rumors. Coughing echoes through the streets.",
                Effects::NONE,
            )
            .with_modifier(ModifierTemplate {
                source: "Spreading sickness",
                days: 3,
                effects: fx(0, -2, -5),
            }),
        ),
    },
    EventCard {
        petitioner: "A Cheerful Villager",
        prompt: "Let's celebrate the end of winter with a grand Spring Festival! It will cost 40 gold.",
        on_yes: Branch::Single(Outcome::flat(
            "The festival is a joyous success!",
            fx(-40, 25, 0),
        )),
        on_no: Branch::Single(Outcome::flat(
            "You cancel the festival.",
            fx(0, -10, 0),
        )),
    },
    EventCard {
        petitioner: "A Worried Farmer",
        prompt: "There has been no rain for weeks! Our crops are withering. We need 50 gold for irrigation.",
        on_yes: Branch::Single(Outcome::flat(
            "The irrigation effort saves the harvest!",
            fx(-50, 0, 5),
        )),
        on_no: Branch::Single(Outcome::flat(
            "The crops fail under the blazing sun.",
            fx(0, -10, -10),
        )),
    },
    EventCard {
        petitioner: "The Royal Treasurer",
        prompt: "My liege, the autumn harvest has been exceptionally bountiful! We have a surplus of 100 gold.",
        on_yes: Branch::Single(Outcome::flat(
            "You order a feast to celebrate!",
            fx(50, 10, 0),
        )),
        on_no: Branch::Single(Outcome::flat(
            "You wisely store the entire surplus.",
            fx(100, -5, 0),
        )),
    },
    EventCard {
        petitioner: "The Guard Captain",
        prompt: "A fierce blizzard has buried the kingdom in snow! We need 70 gold for a relief effort.",
        on_yes: Branch::Single(Outcome::flat(
            "The relief effort is a success!",
            fx(-70, 20, 5),
        )),
        on_no: Branch::Single(Outcome::flat(
            "The kingdom remains paralyzed. Some do not survive the cold.",
            fx(0, -20, -15),
        )),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_card_is_well_formed() {
        assert!(!STANDARD_CARDS.is_empty());
        for card in STANDARD_CARDS {
            assert!(card.is_well_formed(), "malformed card: {}", card.petitioner);
        }
    }

    #[test]
    fn catalog_exercises_modifiers_and_weighted_branches() {
        let has_modifier = STANDARD_CARDS.iter().any(|c| {
            matches!(c.on_yes, Branch::Single(o) if o.modifier.is_some())
                || matches!(c.on_no, Branch::Single(o) if o.modifier.is_some())
        });
        let has_weighted = STANDARD_CARDS
            .iter()
            .any(|c| matches!(c.on_yes, Branch::Weighted(_)));
        assert!(has_modifier);
        assert!(has_weighted);
    }
}
