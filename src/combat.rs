//! Dice combat between an attacking and a defending stack.

use rand::Rng;

/// Losses and surviving troops of a sequence of dice rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleReport {
    pub attacker_losses: u32,
    pub defender_losses: u32,
    pub attacker_troops: u32,
    pub defender_troops: u32,
}

fn roll<R: Rng + ?Sized>(rng: &mut R, dice: u32) -> Vec<u32> {
    let mut rolls: Vec<u32> = (0..dice).map(|_| rng.gen_range(1..=6)).collect();
    rolls.sort_unstable_by(|a, b| b.cmp(a));
    rolls
}

/// Rolls one exchange and returns `(attacker_losses, defender_losses)`.
///
/// The highest dice of both sides are paired; the attacker needs a strictly
/// greater value to win a pair.
pub fn resolve_round<R: Rng + ?Sized>(rng: &mut R, attacker_dice: u32, defender_dice: u32) -> (u32, u32) {
    let attacker_rolls = roll(rng, attacker_dice);
    let defender_rolls = roll(rng, defender_dice);

    let mut attacker_losses = 0;
    let mut defender_losses = 0;
    for (attack, defend) in attacker_rolls.iter().zip(defender_rolls.iter()) {
        if attack > defend {
            defender_losses += 1;
        } else {
            attacker_losses += 1;
        }
    }
    (attacker_losses, defender_losses)
}

/// Fights rounds while the attacker holds at least `continue_threshold`
/// troops and the defender is not wiped out.
pub fn resolve_until<R: Rng + ?Sized>(
    rng: &mut R,
    attacker_troops: u32,
    defender_troops: u32,
    continue_threshold: u32,
) -> BattleReport {
    let mut report = BattleReport {
        attacker_losses: 0,
        defender_losses: 0,
        attacker_troops,
        defender_troops,
    };

    while report.attacker_troops >= continue_threshold && report.defender_troops > 0 {
        let attacker_dice = report.attacker_troops.saturating_sub(1).min(3);
        let defender_dice = report.defender_troops.min(2);
        if attacker_dice == 0 {
            break;
        }
        let (attacker_loss, defender_loss) = resolve_round(rng, attacker_dice, defender_dice);
        report.attacker_troops -= attacker_loss;
        report.defender_troops -= defender_loss;
        report.attacker_losses += attacker_loss;
        report.defender_losses += defender_loss;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_round_losses_bounded_by_pairs() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let (a, d) = resolve_round(&mut rng, 3, 2);
            assert_eq!(a + d, 2);
            let (a, d) = resolve_round(&mut rng, 1, 2);
            assert_eq!(a + d, 1);
        }
    }

    #[test]
    fn test_zero_dice_is_no_exchange() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(resolve_round(&mut rng, 0, 2), (0, 0));
        assert_eq!(resolve_round(&mut rng, 3, 0), (0, 0));
    }

    #[test]
    fn test_single_die_odds_favour_defender_on_ties() {
        // One die against one die: the attacker wins 15 of 36 outcomes.
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let trials = 60_000;
        let wins = (0..trials)
            .filter(|_| resolve_round(&mut rng, 1, 1) == (0, 1))
            .count();
        let ratio = wins as f64 / trials as f64;
        assert!((ratio - 15.0 / 36.0).abs() < 0.01, "ratio {}", ratio);
    }

    #[test]
    fn test_until_conserves_troops() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for seed_troops in 2..30 {
            let report = resolve_until(&mut rng, seed_troops, 7, 3);
            assert_eq!(report.attacker_troops + report.attacker_losses, seed_troops);
            assert_eq!(report.defender_troops + report.defender_losses, 7);
            assert!(report.defender_troops == 0 || report.attacker_troops < 3);
        }
    }

    #[test]
    fn test_threshold_stops_early() {
        // 5 vs 1 with threshold 4: every round costs one troop, and the
        // attacker falls under the threshold after its second loss.
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let report = resolve_until(&mut rng, 5, 1, 4);
            assert!(report.attacker_losses + report.defender_losses <= 2);
            assert!(report.attacker_losses <= 2);
            assert!(report.defender_troops == 0 || report.attacker_troops == 3);
        }
    }

    #[test]
    fn test_below_threshold_no_rounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let report = resolve_until(&mut rng, 3, 5, 4);
        assert_eq!(report.attacker_losses, 0);
        assert_eq!(report.defender_troops, 5);
    }
}
