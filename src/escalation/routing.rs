//! Deterministic routing matrix.
//!
//! `(escalation level, urgency)` maps to the target role set, delivery
//! channels, and a response-time estimate. The decision is computed once
//! at event creation and stored with the event.

use crate::core::{CareRole, DeliveryChannel, EscalationLevel, RoutingDecision, Urgency};

/// Compute the routing decision for an escalation
pub fn route(level: EscalationLevel, urgency: Urgency) -> RoutingDecision {
    match level {
        EscalationLevel::Emergency => RoutingDecision {
            routed_to: vec![
                CareRole::EmergencyDepartment,
                CareRole::OnCallPhysician,
                CareRole::ChargeNurse,
            ],
            delivery_methods: vec![
                DeliveryChannel::SmsAlert,
                DeliveryChannel::PhoneCall,
                DeliveryChannel::DashboardNotification,
            ],
            estimated_response_minutes: 5,
        },
        EscalationLevel::Physician => {
            if urgency == Urgency::Immediate {
                RoutingDecision {
                    routed_to: vec![CareRole::PrimaryCarePhysician, CareRole::ChargeNurse],
                    delivery_methods: vec![
                        DeliveryChannel::PhoneCall,
                        DeliveryChannel::DashboardNotification,
                        DeliveryChannel::SmsAlert,
                    ],
                    estimated_response_minutes: 15,
                }
            } else {
                RoutingDecision {
                    routed_to: vec![CareRole::PrimaryCarePhysician, CareRole::ChargeNurse],
                    delivery_methods: vec![
                        DeliveryChannel::DashboardNotification,
                        DeliveryChannel::Email,
                    ],
                    estimated_response_minutes: 60,
                }
            }
        }
        EscalationLevel::Specialist => RoutingDecision {
            routed_to: vec![CareRole::Specialist, CareRole::PrimaryCarePhysician],
            delivery_methods: vec![
                DeliveryChannel::DashboardNotification,
                DeliveryChannel::Email,
            ],
            estimated_response_minutes: 240,
        },
        EscalationLevel::Nurse => RoutingDecision {
            routed_to: vec![CareRole::ChargeNurse, CareRole::CaseManager],
            delivery_methods: vec![DeliveryChannel::DashboardNotification],
            estimated_response_minutes: 120,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn emergency_reaches_the_full_response_team_in_five_minutes() {
        let decision = route(EscalationLevel::Emergency, Urgency::Immediate);
        assert_eq!(
            decision.routed_to,
            vec![
                CareRole::EmergencyDepartment,
                CareRole::OnCallPhysician,
                CareRole::ChargeNurse,
            ]
        );
        assert_eq!(decision.estimated_response_minutes, 5);
        assert_eq!(decision.estimated_response_display(), "5 minutes");
    }

    #[test]
    fn physician_routing_splits_on_urgency() {
        let immediate = route(EscalationLevel::Physician, Urgency::Immediate);
        assert!(immediate
            .delivery_methods
            .contains(&DeliveryChannel::PhoneCall));
        assert_eq!(immediate.estimated_response_minutes, 15);

        let urgent = route(EscalationLevel::Physician, Urgency::Urgent);
        assert_eq!(
            urgent.delivery_methods,
            vec![
                DeliveryChannel::DashboardNotification,
                DeliveryChannel::Email,
            ]
        );
        assert_eq!(urgent.estimated_response_minutes, 60);

        let routine = route(EscalationLevel::Physician, Urgency::Routine);
        assert_eq!(routine, urgent);
    }

    #[test]
    fn specialist_and_nurse_targets_are_fixed() {
        let specialist = route(EscalationLevel::Specialist, Urgency::Routine);
        assert_eq!(specialist.estimated_response_minutes, 240);
        assert_eq!(specialist.estimated_response_display(), "4 hours");

        let nurse = route(EscalationLevel::Nurse, Urgency::Urgent);
        assert_eq!(
            nurse.delivery_methods,
            vec![DeliveryChannel::DashboardNotification]
        );
        assert_eq!(nurse.estimated_response_minutes, 120);
        assert_eq!(nurse.estimated_response_display(), "2 hours");
    }

    #[test]
    fn routing_is_deterministic() {
        for level in [
            EscalationLevel::Nurse,
            EscalationLevel::Physician,
            EscalationLevel::Specialist,
            EscalationLevel::Emergency,
        ] {
            for urgency in [Urgency::Immediate, Urgency::Urgent, Urgency::Routine] {
                assert_eq!(route(level, urgency), route(level, urgency));
            }
        }
    }
}
