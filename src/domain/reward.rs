//! Agreement-based reward between the two classification oracles

use serde::{Deserialize, Serialize};

use crate::domain::classification::Label;

/// Full agreement between the oracles
pub const REWARD_AGREE: i32 = 5;
/// One oracle abstained with `Maybe` while the other committed
pub const REWARD_UNSURE: i32 = -1;
/// Hard disagreement, `Yes` against `No`
pub const REWARD_CONFLICT: i32 = -5;

/// Compare the primary and secondary oracle labels and assign a reward.
///
/// Total over the 3x3 label space and symmetric in its arguments.
pub fn reward(primary: Label, secondary: Label) -> i32 {
    if primary == secondary {
        REWARD_AGREE
    } else if primary == Label::Maybe || secondary == Label::Maybe {
        REWARD_UNSURE
    } else {
        REWARD_CONFLICT
    }
}

/// The reconciled judgment for one feature, the downstream learning signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRecord {
    pub primary_label: Label,
    pub oracle_label: Label,
    pub reward: i32,
}

impl RewardRecord {
    pub fn new(primary_label: Label, oracle_label: Label) -> Self {
        Self {
            primary_label,
            oracle_label,
            reward: reward(primary_label, oracle_label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Maybe, No, Yes};

    #[test]
    fn test_reward_table_all_nine_combinations() {
        let expected = [
            (Yes, Yes, REWARD_AGREE),
            (No, No, REWARD_AGREE),
            (Maybe, Maybe, REWARD_AGREE),
            (Maybe, Yes, REWARD_UNSURE),
            (Maybe, No, REWARD_UNSURE),
            (Yes, Maybe, REWARD_UNSURE),
            (No, Maybe, REWARD_UNSURE),
            (Yes, No, REWARD_CONFLICT),
            (No, Yes, REWARD_CONFLICT),
        ];

        for (p, g, want) in expected {
            assert_eq!(reward(p, g), want, "reward({p}, {g})");
        }
    }

    #[test]
    fn test_reward_is_total_and_symmetric() {
        for p in Label::ALL {
            for g in Label::ALL {
                let r = reward(p, g);
                assert!(
                    [REWARD_AGREE, REWARD_UNSURE, REWARD_CONFLICT].contains(&r),
                    "reward({p}, {g}) = {r} is outside the table"
                );
                assert_eq!(r, reward(g, p), "reward({p}, {g}) not symmetric");
            }
        }
    }

    #[test]
    fn test_reward_record() {
        let record = RewardRecord::new(Yes, Maybe);
        assert_eq!(record.reward, REWARD_UNSURE);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["primary_label"], "Yes");
        assert_eq!(json["oracle_label"], "Maybe");
        assert_eq!(json["reward"], -1);
    }
}
