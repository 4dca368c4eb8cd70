//! Detailed report parsing.
//!
//! Pure functions over the XML documents returned by the analysis
//! service: no I/O, no side effects, deterministic. The flaw counting
//! rules here are the heart of the findings data — fixed flaws vanish
//! entirely, accepted mitigations are excluded from counts but flagged,
//! everything else counts.

use roxmltree::{Document, Node};
use tracing::debug;

use crate::domain::errors::ReviewError;
use crate::domain::models::analysis::BuildInfo;
use crate::domain::models::report::{ComponentFact, RawFacts, ScaFacts};
use crate::domain::models::severity::{Severity, SEVERITY_LEVELS};

/// Remediation status meaning a flaw was verified resolved.
const REMEDIATION_FIXED: &str = "Fixed";
/// Mitigation status meaning a reviewer accepted (waived) the flaw.
const MITIGATION_ACCEPTED: &str = "accepted";

/// Flaw collections counted with identical rules.
const FLAW_COLLECTIONS: [&str; 2] = ["staticflaws", "dynamicflaws"];

/// Parse a detailed findings report document into raw per-build facts.
pub fn parse_detailed_report(xml: &str) -> Result<RawFacts, ReviewError> {
    let doc = Document::parse(xml)
        .map_err(|err| ReviewError::MalformedReport(format!("not well-formed XML: {err}")))?;
    let root = doc.root_element();
    if !root.has_tag_name("detailedreport") {
        return Err(ReviewError::MalformedReport(format!(
            "unexpected root element <{}>",
            root.tag_name().name()
        )));
    }

    let mut counts = [0u32; SEVERITY_LEVELS];
    let mut mitigated = [false; SEVERITY_LEVELS];
    let mut policy_affected = [false; SEVERITY_LEVELS];
    for collection in FLAW_COLLECTIONS {
        tally_flaw_collection(
            root,
            collection,
            &mut counts,
            &mut mitigated,
            &mut policy_affected,
        );
    }

    Ok(RawFacts {
        account_id: attr(root, "account_id").to_string(),
        app_id: attr(root, "app_id").to_string(),
        build_id: attr(root, "build_id").to_string(),
        policy_name: attr(root, "policy_name").to_string(),
        policy_compliance_status: attr(root, "policy_compliance_status").to_string(),
        assurance_level: attr(root, "assurance_level").to_string(),
        score: attr(root, "score").parse().unwrap_or(0),
        scan_overdue: attr_bool(root, "scan_overdue"),
        counts,
        mitigated,
        policy_affected,
        net_changes: parse_net_changes(root),
        sca: root
            .descendants()
            .find(|n| n.has_tag_name("software_composition_analysis"))
            .map(parse_sca),
    })
}

/// Parse a build info document down to the linked build's analysis status.
pub fn parse_build_info(xml: &str) -> Result<BuildInfo, ReviewError> {
    let doc = Document::parse(xml)
        .map_err(|err| ReviewError::MalformedReport(format!("not well-formed XML: {err}")))?;
    let root = doc.root_element();
    if !root.has_tag_name("buildinfo") {
        return Err(ReviewError::MalformedReport(format!(
            "unexpected root element <{}>",
            root.tag_name().name()
        )));
    }

    let build = root
        .descendants()
        .find(|n| n.has_tag_name("build"))
        .ok_or_else(|| ReviewError::MalformedReport("build info has no <build> element".into()))?;
    let unit = build
        .descendants()
        .find(|n| n.has_tag_name("analysis_unit"))
        .ok_or_else(|| {
            ReviewError::MalformedReport("build info has no <analysis_unit> element".into())
        })?;

    Ok(BuildInfo {
        build_id: attr(build, "build_id").to_string(),
        analysis_unit_status: attr(unit, "status").to_string(),
    })
}

fn attr<'a>(node: Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or("")
}

fn attr_bool(node: Node<'_, '_>, name: &str) -> bool {
    node.attribute(name) == Some("true")
}

fn tally_flaw_collection(
    root: Node<'_, '_>,
    collection: &str,
    counts: &mut [u32; SEVERITY_LEVELS],
    mitigated: &mut [bool; SEVERITY_LEVELS],
    policy_affected: &mut [bool; SEVERITY_LEVELS],
) {
    for group in root.descendants().filter(|n| n.has_tag_name(collection)) {
        for flaw in group.children().filter(|n| n.has_tag_name("flaw")) {
            let Some(severity) = attr(flaw, "severity")
                .parse::<u8>()
                .ok()
                .and_then(Severity::from_level)
            else {
                // Out-of-range severity skips the single flaw, not the parse.
                debug!(
                    severity = attr(flaw, "severity"),
                    "skipping flaw with unrecognized severity"
                );
                continue;
            };
            let index = severity.index();

            if attr(flaw, "remediation_status") == REMEDIATION_FIXED {
                continue;
            }
            if attr_bool(flaw, "affects_policy_compliance") {
                policy_affected[index] = true;
            }
            if attr(flaw, "mitigation_status") == MITIGATION_ACCEPTED {
                mitigated[index] = true;
            } else {
                counts[index] += 1;
            }
        }
    }
}

/// Read the per-severity change attributes off the summary node.
///
/// Absent or unparsable attributes default to 0. The schema never emits a
/// `sev-0-change` attribute, so severity 0 always stays at 0.
fn parse_net_changes(root: Node<'_, '_>) -> [i64; SEVERITY_LEVELS] {
    let mut changes = [0i64; SEVERITY_LEVELS];
    if let Some(status) = root.descendants().find(|n| n.has_tag_name("flaw-status")) {
        for severity in Severity::ALL {
            let name = format!("sev-{}-change", severity.level());
            changes[severity.index()] = status
                .attribute(name.as_str())
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(0);
        }
    }
    changes
}

fn parse_sca(section: Node<'_, '_>) -> ScaFacts {
    let mut counts = [0u32; SEVERITY_LEVELS];
    let mut mitigated = [false; SEVERITY_LEVELS];
    let mut max_cvss: Option<f64> = None;
    let mut components = Vec::new();

    for component in section.descendants().filter(|n| n.has_tag_name("component")) {
        if let Some(score) = component
            .attribute("max_cvss_score")
            .and_then(|raw| raw.parse::<f64>().ok())
        {
            max_cvss = Some(max_cvss.map_or(score, |current| current.max(score)));
        }
        components.push(ComponentFact {
            name: attr(component, "component_name").to_string(),
            blacklisted: attr_bool(component, "blacklisted"),
            is_new: attr_bool(component, "new"),
            violates_policy: attr_bool(component, "violated_policy_rules"),
        });

        for vulnerability in component
            .descendants()
            .filter(|n| n.has_tag_name("vulnerability"))
        {
            let Some(severity) = attr(vulnerability, "severity")
                .parse::<u8>()
                .ok()
                .and_then(Severity::from_level)
            else {
                debug!(
                    severity = attr(vulnerability, "severity"),
                    "skipping vulnerability with unrecognized severity"
                );
                continue;
            };
            if attr_bool(vulnerability, "mitigation") {
                mitigated[severity.index()] = true;
            } else {
                counts[severity.index()] += 1;
            }
        }
    }

    ScaFacts {
        counts,
        mitigated,
        max_cvss_score: max_cvss.unwrap_or(-1.0),
        blacklisted_count: attr(section, "blacklisted_components")
            .parse()
            .unwrap_or(0),
        components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(body: &str) -> String {
        format!(
            r#"<detailedreport account_id="acct-1" app_id="app-9" build_id="b-42"
                policy_name="Corporate Baseline" policy_compliance_status="Pass"
                assurance_level="AL4" score="91" scan_overdue="false">{body}</detailedreport>"#
        )
    }

    #[test]
    fn test_root_attributes() {
        let facts = parse_detailed_report(&report("")).unwrap();
        assert_eq!(facts.account_id, "acct-1");
        assert_eq!(facts.app_id, "app-9");
        assert_eq!(facts.build_id, "b-42");
        assert_eq!(facts.policy_name, "Corporate Baseline");
        assert_eq!(facts.policy_compliance_status, "Pass");
        assert_eq!(facts.assurance_level, "AL4");
        assert_eq!(facts.score, 91);
        assert!(!facts.scan_overdue);
        assert_eq!(facts.total(), 0);
    }

    #[test]
    fn test_fixed_flaws_never_count_and_accepted_mitigations_flag() {
        // One accepted mitigation, one open flaw, one fixed flaw, all severity 3.
        let xml = report(
            r#"<severity level="3"><category><cwe><dynamicflaws>
                 <flaw severity="3" mitigation_status="accepted" remediation_status="Open"/>
                 <flaw severity="3" mitigation_status="none" remediation_status="Open"/>
                 <flaw severity="3" mitigation_status="accepted" remediation_status="Fixed"/>
               </dynamicflaws></cwe></category></severity>"#,
        );
        let facts = parse_detailed_report(&xml).unwrap();
        assert_eq!(facts.counts[3], 1);
        assert!(facts.mitigated[3]);
        assert_eq!(facts.total(), 1);
    }

    #[test]
    fn test_static_and_dynamic_collections_count_identically() {
        let xml = report(
            r#"<severity level="4"><category><cwe>
                 <staticflaws><flaw severity="4" remediation_status="Open"/></staticflaws>
                 <dynamicflaws><flaw severity="4" remediation_status="Open"/></dynamicflaws>
               </cwe></category></severity>"#,
        );
        let facts = parse_detailed_report(&xml).unwrap();
        assert_eq!(facts.counts[4], 2);
    }

    #[test]
    fn test_total_is_sum_over_severities() {
        let xml = report(
            r#"<severity level="1"><category><cwe><staticflaws>
                 <flaw severity="1"/><flaw severity="1"/>
               </staticflaws></cwe></category></severity>
               <severity level="5"><category><cwe><dynamicflaws>
                 <flaw severity="5"/>
               </dynamicflaws></cwe></category></severity>"#,
        );
        let facts = parse_detailed_report(&xml).unwrap();
        assert_eq!(facts.counts.iter().map(|&c| u64::from(c)).sum::<u64>(), 3);
        assert_eq!(facts.total(), 3);
    }

    #[test]
    fn test_policy_flag_survives_mitigation() {
        let xml = report(
            r#"<severity level="2"><category><cwe><dynamicflaws>
                 <flaw severity="2" mitigation_status="accepted"
                       affects_policy_compliance="true"/>
               </dynamicflaws></cwe></category></severity>"#,
        );
        let facts = parse_detailed_report(&xml).unwrap();
        assert_eq!(facts.counts[2], 0);
        assert!(facts.mitigated[2]);
        assert!(facts.policy_affected[2]);
    }

    #[test]
    fn test_out_of_range_severity_skips_single_flaw() {
        let xml = report(
            r#"<severity level="3"><category><cwe><dynamicflaws>
                 <flaw severity="9"/>
                 <flaw severity="3"/>
               </dynamicflaws></cwe></category></severity>"#,
        );
        let facts = parse_detailed_report(&xml).unwrap();
        assert_eq!(facts.total(), 1);
        assert_eq!(facts.counts[3], 1);
    }

    #[test]
    fn test_net_changes_read_from_summary_node() {
        let xml = report(
            r#"<flaw-status new="4" fixed="1" sev-1-change="2" sev-2-change="-1"
                 sev-4-change="0" sev-5-change="3"/>"#,
        );
        let facts = parse_detailed_report(&xml).unwrap();
        // sev-0-change is never emitted; sev-3-change absent here.
        assert_eq!(facts.net_changes, [0, 2, -1, 0, 0, 3]);
    }

    #[test]
    fn test_unparsable_change_defaults_to_zero() {
        let xml = report(r#"<flaw-status sev-1-change="many"/>"#);
        let facts = parse_detailed_report(&xml).unwrap();
        assert_eq!(facts.net_changes[1], 0);
    }

    #[test]
    fn test_sca_absent_means_unsubscribed() {
        let facts = parse_detailed_report(&report("")).unwrap();
        assert!(facts.sca.is_none());
    }

    #[test]
    fn test_sca_counting_mirrors_flaw_rules() {
        let xml = report(
            r#"<software_composition_analysis blacklisted_components="2">
                 <vulnerable_components>
                   <component component_name="libalpha" max_cvss_score="7.5"
                              blacklisted="true" new="true" violated_policy_rules="true">
                     <vulnerabilities>
                       <vulnerability severity="4" cvss_score="7.5" mitigation="false"/>
                       <vulnerability severity="4" cvss_score="6.1" mitigation="true"/>
                     </vulnerabilities>
                   </component>
                   <component component_name="libbeta" max_cvss_score="3.2">
                     <vulnerabilities>
                       <vulnerability severity="1" mitigation="false"/>
                     </vulnerabilities>
                   </component>
                 </vulnerable_components>
               </software_composition_analysis>"#,
        );
        let facts = parse_detailed_report(&xml).unwrap();
        let sca = facts.sca.unwrap();
        assert_eq!(sca.counts[4], 1);
        assert!(sca.mitigated[4]);
        assert_eq!(sca.counts[1], 1);
        assert!((sca.max_cvss_score - 7.5).abs() < f64::EPSILON);
        assert_eq!(sca.blacklisted_count, 2);
        assert_eq!(sca.components.len(), 2);
        assert!(sca.components[0].blacklisted);
        assert!(sca.components[0].is_new);
        assert!(sca.components[0].violates_policy);
        assert!(!sca.components[1].blacklisted);
    }

    #[test]
    fn test_sca_without_scores_reports_sentinel() {
        let xml = report(
            r#"<software_composition_analysis>
                 <vulnerable_components>
                   <component component_name="libgamma"/>
                 </vulnerable_components>
               </software_composition_analysis>"#,
        );
        let facts = parse_detailed_report(&xml).unwrap();
        let sca = facts.sca.unwrap();
        assert!((sca.max_cvss_score - -1.0).abs() < f64::EPSILON);
        assert_eq!(sca.total(), 0);
    }

    #[test]
    fn test_empty_document_is_malformed() {
        assert!(matches!(
            parse_detailed_report(""),
            Err(ReviewError::MalformedReport(_))
        ));
        assert!(matches!(
            parse_detailed_report("not xml at all"),
            Err(ReviewError::MalformedReport(_))
        ));
    }

    #[test]
    fn test_wrong_root_is_malformed() {
        assert!(matches!(
            parse_detailed_report("<summaryreport/>"),
            Err(ReviewError::MalformedReport(_))
        ));
    }

    #[test]
    fn test_build_info_status() {
        let xml = r#"<buildinfo><build build_id="b-42">
            <analysis_unit analysis_type="Dynamic" status="Results Ready"/>
        </build></buildinfo>"#;
        let info = parse_build_info(xml).unwrap();
        assert_eq!(info.build_id, "b-42");
        assert!(info.results_ready());

        let xml = r#"<buildinfo><build build_id="b-42">
            <analysis_unit analysis_type="Dynamic" status="Scan In Process"/>
        </build></buildinfo>"#;
        assert!(!parse_build_info(xml).unwrap().results_ready());
    }

    #[test]
    fn test_build_info_without_unit_is_malformed() {
        assert!(matches!(
            parse_build_info("<buildinfo><build build_id=\"b\"/></buildinfo>"),
            Err(ReviewError::MalformedReport(_))
        ));
    }
}
