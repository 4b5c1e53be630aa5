/*!

This is the long-form manual for `survey_tally` and `sitesurvey`.

## Survey configurations

All the surveys of a site are declared in a single JSON file, by default
`config/survey_configurations.json`. The file contains an array, one
element per survey:

```text
[
  {
    "slug_identifier": "site_feedback",
    "post_type_definition": { ... },
    "survey_questions_config": { ... }
  }
]
```

`slug_identifier` is the name used to refer to the survey from the command
line and in the hidden `survey_slug` field of a submitted form. When no
survey has the requested identifier, the first survey of the file is used
instead and a warning is logged.

### `post_type_definition`

The record type under which the submissions are stored.

- `slug` (required) the identifier of the record type
- `name_plural`, `name_singular` (required)
- `menu_name_main` the menu label, defaults to `name_plural`
- `public` defaults to `false`
- `supports` defaults to `["title", "editor", "custom-fields"]`

### `survey_questions_config`

An object mapping each question key to its definition. The order of the
keys is the order of the questions in the form and in the results.

- `label` the label of the question in the results. Questions without a
  label are not reported.
- `form_label` the label shown in the form, defaults to `label`
- `form_type` one of `text` (the default), `textarea`, `select`, `radio`,
  `checkbox`, `email`, `number`. Unknown types are handled as `text`.
- `form_options` an object mapping option values to option labels, for
  `select`, `radio` and `checkbox`
- `options` an object mapping answer values to the labels used in the
  results, if they should differ from `form_options`
- `required` defaults to `false`
- `legend` consecutive questions with the same legend are shown together
- `type` how the results are shown: `bar_chart`, `radio`, `checkbox` (all
  three are vote count charts) or `text_list`. Questions without a type
  are not reported.

### Checkbox answers

The selected options of a checkbox question are stored as a single
integer: bit `i` is set when the `i`-th option of `form_options` was
selected. As a consequence:

- a checkbox question can have at most 31 options
- reordering the options of a survey that already has submissions changes
  the meaning of the stored answers
- selected values that are not among the options are ignored

## Stored submissions

Each accepted submission is stored as one record of the survey's record
type, titled `Survey Submission - <day>-<month>-<year> <time>`, with one
metadata entry `ans_<key>` per question. Optional questions that were not
answered are stored as an empty string (or `0` for checkboxes).

## Results

For each reported question:

- if nobody answered it: "No answers yet for this question."
- for the chart types: one count per option, in option order, options
  without votes included. Without any option, the distinct answers are
  used as labels, in the order they were first seen.
  The series of the chart is named after the question label ("Count" if
  the question has none).
- if the counts cannot be computed (a checkbox without options, or no
  usable label): "Insufficient data for a chart for this question."
- for `text_list`: the non-blank answers, in the order they were stored.

*/
