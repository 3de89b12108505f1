use crate::celebration::MascotPose;
use crate::session::SessionState;

const IDLE: &[&str] = &[r"  /\_/\  ", r" ( o.o ) ", r"  > ^ <  "];
const FOCUSED: &[&str] = &[r"  /\_/\  ", r" ( -.- ) ", r"  > ^ <  "];
const NAPPING: &[&str] = &[r"  /\_/\  ", r" ( u.u ) z", r"  > ^ <  "];
const HAPPY: &[&str] = &[r"  /\_/\  ", r" ( ^.^ ) ", r"  > ^ <  "];

const SPIN: [&[&str]; 4] = [
    &[r"  /\_/\  ", r" ( o.o ) ", r"  > ^ <  "],
    &[r"   /\_/\ ", r"  ( o.o)>", r"   > ^ < "],
    &[r"  /\_/\  ", r" (     ) ", r"  >   <  "],
    &[r" /\_/\   ", r"<(o.o )  ", r" > ^ <   "],
];

/// Mascot lines for the current session state, or the spin frame while
/// celebrating
pub fn art(state: SessionState, pose: MascotPose) -> &'static [&'static str] {
    if let MascotPose::Spinning(frame) = pose {
        return SPIN[frame % SPIN.len()];
    }
    match state {
        SessionState::Idle => IDLE,
        SessionState::Running => FOCUSED,
        SessionState::Stopped => NAPPING,
        SessionState::Finished => HAPPY,
    }
}

pub fn height() -> u16 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pose_has_the_same_height() {
        let states = [
            SessionState::Idle,
            SessionState::Running,
            SessionState::Stopped,
            SessionState::Finished,
        ];
        for state in states {
            assert_eq!(art(state, MascotPose::Sitting).len(), height() as usize);
            for frame in 0..6 {
                assert_eq!(
                    art(state, MascotPose::Spinning(frame)).len(),
                    height() as usize
                );
            }
        }
    }

    #[test]
    fn finished_cat_is_happy() {
        let lines = art(SessionState::Finished, MascotPose::Sitting);
        assert!(lines[1].contains("^.^"));
    }
}
